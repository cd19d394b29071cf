use crate::types::{ButtonType, DeviceButtonId};

/// A fixed set of buttons described by a fieldless enum.
///
/// Usually derived with `#[derive(ButtonLayout)]`: ids follow declaration
/// order from zero, names are the snake_case variant names unless overridden
/// with `#[button(name = "...")]`, and `#[button(float)]` marks float buttons.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, ButtonLayout)]
/// enum StickButton {
///     #[button(float)]
///     AxisX,
///     #[button(float)]
///     AxisY,
///     #[button(name = "press")]
///     Click,
/// }
/// ```
pub trait ButtonLayout: Sized + Copy + 'static {
    /// Number of buttons in the layout.
    const COUNT: usize;

    fn id(self) -> DeviceButtonId;
    fn from_id(id: DeviceButtonId) -> Option<Self>;
    fn name(self) -> &'static str;
    fn from_name(name: &str) -> Option<Self>;
    fn button_type(self) -> ButtonType;

    /// Whether `id` belongs to the layout.
    fn contains(id: DeviceButtonId) -> bool {
        (id as usize) < Self::COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::ButtonLayout;
    use crate::types::ButtonType;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, crate::ButtonLayout)]
    enum StickButton {
        #[button(float)]
        AxisX,
        #[button(float)]
        AxisY,
        #[button(name = "press")]
        Click,
        DPadUp,
    }

    #[test]
    fn ids_follow_declaration_order() {
        assert_eq!(StickButton::COUNT, 4);
        assert_eq!(StickButton::AxisX.id(), 0);
        assert_eq!(StickButton::DPadUp.id(), 3);
        assert_eq!(StickButton::from_id(2), Some(StickButton::Click));
        assert_eq!(StickButton::from_id(4), None);
        assert!(StickButton::contains(3));
        assert!(!StickButton::contains(4));
    }

    #[test]
    fn names_default_to_snake_case() {
        assert_eq!(StickButton::AxisY.name(), "axis_y");
        assert_eq!(StickButton::DPadUp.name(), "d_pad_up");
        assert_eq!(StickButton::Click.name(), "press");
        assert_eq!(StickButton::from_name("press"), Some(StickButton::Click));
        assert_eq!(StickButton::from_name("click"), None);
    }

    #[test]
    fn float_attribute_sets_button_type() {
        assert_eq!(StickButton::AxisX.button_type(), ButtonType::Float);
        assert_eq!(StickButton::Click.button_type(), ButtonType::Bool);
    }
}
