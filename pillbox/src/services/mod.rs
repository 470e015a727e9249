mod pill;

pub use pill::{parse_efficacy_terms, PillService};
