//! 样式系统：值类型与属性元数据表。

pub mod property;
pub mod value;

pub use property::{ElementKinds, StyleProperty};
pub use value::*;
