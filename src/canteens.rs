use crate::errors::{ApiError, Result};
use crate::ingestion::provider::ProviderMeal;

/// Role of a dish within a day's menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Course {
    Soup,
    Main,
    Addition,
}

impl Course {
    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Soup => "SOUP",
            Course::Main => "MAIN",
            Course::Addition => "ADDITION",
        }
    }

    pub fn from_str(value: &str) -> Option<Course> {
        match value {
            "SOUP" => Some(Course::Soup),
            "MAIN" => Some(Course::Main),
            "ADDITION" => Some(Course::Addition),
            _ => None,
        }
    }
}

/// Identity of a known canteen. The set is fixed at compile time; adding
/// an institution means adding a variant plus its entry in `CANTEENS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanteenId {
    Ceskolipska,
    GymLitomerice,
}

/// One institution's cafeteria: provider number, email policy and
/// meal-type coding convention.
#[derive(Debug)]
pub struct Canteen {
    pub id: CanteenId,
    /// Provider-assigned id, used when fetching the upstream menu.
    pub number: &'static str,
    /// Internal name, stable across releases (used in logs and lookups).
    pub name: &'static str,
    email_domain: &'static str,
}

/// All registered canteens. `number` must stay unique across entries.
pub static CANTEENS: &[Canteen] = &[
    Canteen {
        id: CanteenId::Ceskolipska,
        number: "3753",
        name: "CESKOLIPSKA",
        email_domain: "ceskolipska.cz",
    },
    Canteen {
        id: CanteenId::GymLitomerice,
        number: "4102",
        name: "GYM_LITOMERICE",
        email_domain: "gym-lt.cz",
    },
];

impl Canteen {
    /// Whether this canteen accepts the given email address.
    pub fn email_valid(&self, email: &str) -> bool {
        match email.rsplit_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.eq_ignore_ascii_case(self.email_domain),
            None => false,
        }
    }

    /// Filters provider placeholder rows ("closed", holiday markers and
    /// similar filler the provider emits instead of real meals).
    pub fn meal_valid(&self, raw: &ProviderMeal) -> bool {
        let name = raw.name.trim();
        if name.is_empty() || name == "-" || name == "*" {
            return false;
        }
        match self.id {
            // Ceskolipska pads short days with a literal "---" row.
            CanteenId::Ceskolipska => name != "---",
            CanteenId::GymLitomerice => !name.eq_ignore_ascii_case("zavřeno"),
        }
    }

    /// Translates the provider's raw meal-type code into a course.
    ///
    /// Soup and addition markers are per-canteen; anything that parses as
    /// an integer is a main course (the integer disambiguates multiple
    /// concurrent mains). Any other code means the provider changed its
    /// format and an operator has to look at it.
    pub fn translate_course(&self, raw_code: &str) -> Result<Course> {
        let code = raw_code.trim();
        let (soup, addition) = match self.id {
            CanteenId::Ceskolipska => ("P", "D"),
            CanteenId::GymLitomerice => ("P", "O"),
        };
        if code.eq_ignore_ascii_case(soup) {
            return Ok(Course::Soup);
        }
        if code.eq_ignore_ascii_case(addition) {
            return Ok(Course::Addition);
        }
        if code.parse::<i32>().is_ok() {
            return Ok(Course::Main);
        }
        Err(ApiError::UnknownMealType {
            canteen: self.name,
            code: raw_code.to_string(),
        })
    }
}

/// Resolves the single canteen responsible for an email address.
///
/// Zero matches is a normal user error (unknown school). More than one
/// match means two canteens claim the same domain, which is a broken
/// static configuration and is reported as an integrity error.
pub fn by_email(email: &str) -> Result<&'static Canteen> {
    let mut matches = CANTEENS.iter().filter(|c| c.email_valid(email));
    let first = matches.next().ok_or(ApiError::NoMatchingCanteen)?;
    if matches.next().is_some() {
        return Err(ApiError::AmbiguousCanteen(email.to_string()));
    }
    Ok(first)
}

pub fn by_number(number: &str) -> Result<&'static Canteen> {
    CANTEENS
        .iter()
        .find(|c| c.number == number)
        .ok_or_else(|| ApiError::UnknownCanteen(number.to_string()))
}

pub fn by_name(name: &str) -> Result<&'static Canteen> {
    CANTEENS
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| ApiError::UnknownCanteen(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> ProviderMeal {
        ProviderMeal {
            name: name.to_string(),
            meal_type: "1".to_string(),
        }
    }

    #[test]
    fn test_canteen_numbers_are_unique() {
        for (i, a) in CANTEENS.iter().enumerate() {
            for b in &CANTEENS[i + 1..] {
                assert_ne!(a.number, b.number);
            }
        }
    }

    #[test]
    fn test_by_email_resolves_exactly_one() {
        let canteen = by_email("student@ceskolipska.cz").unwrap();
        assert_eq!(canteen.id, CanteenId::Ceskolipska);

        assert!(matches!(
            by_email("student@elsewhere.example"),
            Err(ApiError::NoMatchingCanteen)
        ));
        assert!(matches!(by_email("not-an-email"), Err(ApiError::NoMatchingCanteen)));
    }

    #[test]
    fn test_translate_course() {
        let canteen = by_name("CESKOLIPSKA").unwrap();
        assert_eq!(canteen.translate_course("P").unwrap(), Course::Soup);
        assert_eq!(canteen.translate_course("D").unwrap(), Course::Addition);
        assert_eq!(canteen.translate_course("1").unwrap(), Course::Main);
        assert_eq!(canteen.translate_course("2").unwrap(), Course::Main);
        assert!(matches!(
            canteen.translate_course("X"),
            Err(ApiError::UnknownMealType { .. })
        ));
    }

    #[test]
    fn test_meal_valid_filters_placeholders() {
        let canteen = by_name("CESKOLIPSKA").unwrap();
        assert!(canteen.meal_valid(&raw("Svíčková na smetaně")));
        assert!(!canteen.meal_valid(&raw("")));
        assert!(!canteen.meal_valid(&raw("---")));
        assert!(!canteen.meal_valid(&raw("*")));
    }
}
