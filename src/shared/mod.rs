pub mod coerce;
pub mod constants;
pub mod slug;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
pub mod whatsapp;
