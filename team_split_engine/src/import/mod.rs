pub mod datastructures;
pub mod text_reader;

pub use datastructures::*;
pub use text_reader::{
    count_participants, normalize_count, parse_categories, parse_participants,
    parse_positive_integer,
};
