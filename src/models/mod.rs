// ============================================================================
// MODELS
// ============================================================================
//
// One module per table, each a SeaORM entity (DeriveEntityModel).
//
//   - meals          : distinct dishes (stable id + public UUID + course)
//   - meal_names     : external display name -> meal (dedup key for ingestion)
//   - menu_entries   : one calendar-date serving of a meal at a canteen
//   - users          : verified accounts (unique email, unique name)
//   - registrations  : pending signups awaiting email verification (15 min)
//   - sessions       : bearer tokens issued at login (30 days)
//   - verifications  : single-use email-ownership codes for existing users
//   - ratings        : per-user per-menu-entry rating, upsert on resubmit
//   - photos         : user-uploaded meal photos (file on disk, row here)
//   - dto            : request/response shapes and the API envelope
//
// The canteen table is static (see crate::canteens), not persisted.
// Expiry for registrations/sessions/verifications is computed at read
// time against wall clock; rows are never deleted, only force-expired.
//
// ============================================================================

pub mod dto;
pub mod meal_names;
pub mod meals;
pub mod menu_entries;
pub mod photos;
pub mod ratings;
pub mod registrations;
pub mod sessions;
pub mod users;
pub mod verifications;
