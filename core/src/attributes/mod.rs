pub mod tags;
pub mod values;

pub use values::{
    f64_value, f64_value_or, first_sequence_item, int_value, int_value_or, multi_f64_value,
    multi_string_value, pixel_data_bytes, sequence_items, string_value, string_value_or, u16_value,
};
