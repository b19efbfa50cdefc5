use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn perpendicular(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// An edge of a rectangle. Used for drop sides, header placement and root
/// edge strips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Orientation of the container that a split on this side produces.
    pub fn orientation(self) -> Orientation {
        match self {
            Side::Left | Side::Right => Orientation::Horizontal,
            Side::Top | Side::Bottom => Orientation::Vertical,
        }
    }

    /// Items dropped on a leading side are placed before their neighbour.
    pub fn is_leading(self) -> bool { matches!(self, Side::Left | Side::Top) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemType {
    Root,
    Row,
    Column,
    Stack,
    Component,
}

impl ItemType {
    pub fn orientation(self) -> Option<Orientation> {
        match self {
            ItemType::Row => Some(Orientation::Horizontal),
            ItemType::Column => Some(Orientation::Vertical),
            _ => None,
        }
    }

    pub fn is_row_or_column(self) -> bool { matches!(self, ItemType::Row | ItemType::Column) }

    /// Which kinds may appear directly below this one. The root's single
    /// child limit is enforced by the tree, not here.
    pub fn can_contain(self, child: ItemType) -> bool {
        use ItemType::*;
        match self {
            Root | Row | Column => matches!(child, Row | Column | Stack),
            Stack => child == Component,
            Component => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    mod side_operations {
        use super::*;

        #[test]
        fn side_orientation() {
            assert_eq!(Side::Left.orientation(), Orientation::Horizontal);
            assert_eq!(Side::Right.orientation(), Orientation::Horizontal);
            assert_eq!(Side::Top.orientation(), Orientation::Vertical);
            assert_eq!(Side::Bottom.orientation(), Orientation::Vertical);
        }

        #[test]
        fn leading_sides() {
            let leading: Vec<_> = Side::iter().filter(|s| s.is_leading()).collect();
            assert_eq!(leading, vec![Side::Top, Side::Left]);
        }

        #[test]
        fn displays_in_snake_case() {
            assert_eq!(Side::Bottom.to_string(), "bottom");
            assert_eq!(ItemType::Component.to_string(), "component");
        }
    }

    mod item_type_operations {
        use super::*;

        #[test]
        fn containment_rules() {
            assert!(ItemType::Root.can_contain(ItemType::Stack));
            assert!(ItemType::Row.can_contain(ItemType::Column));
            assert!(ItemType::Stack.can_contain(ItemType::Component));
            assert!(!ItemType::Stack.can_contain(ItemType::Row));
            assert!(!ItemType::Row.can_contain(ItemType::Component));
            assert!(!ItemType::Component.can_contain(ItemType::Component));
            assert!(!ItemType::Column.can_contain(ItemType::Root));
        }

        #[test]
        fn orientation_mapping() {
            assert_eq!(ItemType::Row.orientation(), Some(Orientation::Horizontal));
            assert_eq!(ItemType::Column.orientation(), Some(Orientation::Vertical));
            assert_eq!(ItemType::Stack.orientation(), None);
            assert_eq!(Orientation::Vertical.perpendicular(), Orientation::Horizontal);
        }
    }
}
