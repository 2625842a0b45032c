pub mod buffer;

pub use buffer::{vec_mul_mat, Buffer, Storage};
