//! Ordered-candidate lookup.
//!
//! Several values on an event can come from more than one field. Instead of
//! repeating fallback chains at every call site, each chain is written down
//! once here as a priority list and resolved with [`first_present`].
//!
//! Priority lists:
//! - UID identifier: `id`, then `slug`
//! - Location: `location`, then `location_name`, then `address`
//! - Download filename stem: `slug`, then `id`

/// Returns the value if it holds something other than whitespace.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Returns the first candidate that is present and not blank.
pub fn first_present<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates.into_iter().find_map(non_blank)
}
