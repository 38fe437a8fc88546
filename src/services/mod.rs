pub mod account_service;
pub mod meal_service;
pub mod menu_service;
pub mod photo_service;
pub mod rating_service;

#[cfg(test)]
pub mod test_utils;
