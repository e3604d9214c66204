//! Layout engines: single-axis flow plus the grouped card pass.

mod attributes;
mod flow;
mod group;

pub use attributes::{
    DecorationAttributes, ItemAttributes, LayoutElement, SupplementaryAttributes,
    SupplementarySlot,
};
pub use flow::{Axis, FlowLayout, FlowSource};
pub use group::{DefaultGroupStyle, GroupAppearance, GroupStyle, GroupedFlowLayout};
