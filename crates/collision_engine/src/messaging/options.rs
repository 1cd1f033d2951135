//! Delivery options for a single send

use crate::foundation::entity::EntityId;
use crate::foundation::math::{utils, Vec2};
use crate::messaging::MessageError;

/// Fan-out policy of a send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageScope {
    /// Never forwarded anywhere
    #[default]
    Local,
    /// Exactly the receiver registered under the target id
    Entity,
    /// Every type-matching handler and every receiver
    Global,
    /// Every receiver within range of a position
    Spatial,
}

/// How and when a message is delivered
///
/// ```
/// use collision_engine::messaging::{MessageOptions, MessageScope};
/// use collision_engine::foundation::math::Vec2;
///
/// let options = MessageOptions::spatial(Vec2::new(4.0, 0.0), 2.5).include_sender().deferred();
/// assert_eq!(options.scope, MessageScope::Spatial);
/// assert!(!options.immediate);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessageOptions {
    /// Fan-out policy
    pub scope: MessageScope,
    /// Receiver for `Entity` scope
    pub target_entity: Option<EntityId>,
    /// Epicenter for `Spatial` scope
    pub position: Option<Vec2>,
    /// Radius for `Spatial` scope
    pub range: Option<f32>,
    /// Deliver to the sender too (`Spatial` only)
    pub include_sender: bool,
    /// Dispatch now instead of on the next queue drain
    pub immediate: bool,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self::local()
    }
}

impl MessageOptions {
    fn with_scope(scope: MessageScope) -> Self {
        Self {
            scope,
            target_entity: None,
            position: None,
            range: None,
            include_sender: false,
            immediate: true,
        }
    }

    /// Local scope
    pub fn local() -> Self {
        Self::with_scope(MessageScope::Local)
    }

    /// Entity scope addressed to `target`
    pub fn entity(target: EntityId) -> Self {
        Self {
            target_entity: Some(target),
            ..Self::with_scope(MessageScope::Entity)
        }
    }

    /// Global scope
    pub fn global() -> Self {
        Self::with_scope(MessageScope::Global)
    }

    /// Spatial scope around `position`
    pub fn spatial(position: Vec2, range: f32) -> Self {
        Self {
            position: Some(position),
            range: Some(range),
            ..Self::with_scope(MessageScope::Spatial)
        }
    }

    /// Queue instead of dispatching immediately
    pub fn deferred(mut self) -> Self {
        self.immediate = false;
        self
    }

    /// Let spatial sends reach the sender
    pub fn include_sender(mut self) -> Self {
        self.include_sender = true;
        self
    }

    /// Check that the fields required by the scope are present and sane
    pub fn validate(&self) -> Result<(), MessageError> {
        match self.scope {
            MessageScope::Local | MessageScope::Global => Ok(()),
            MessageScope::Entity => match self.target_entity {
                Some(_) => Ok(()),
                None => Err(MessageError::InvalidOptions("entity scope requires a target entity".to_string())),
            },
            MessageScope::Spatial => {
                let position = self
                    .position
                    .ok_or_else(|| MessageError::InvalidOptions("spatial scope requires a position".to_string()))?;
                let range = self
                    .range
                    .ok_or_else(|| MessageError::InvalidOptions("spatial scope requires a range".to_string()))?;
                if !utils::is_finite(position) {
                    return Err(MessageError::InvalidOptions(format!("spatial position {position:?} is not finite")));
                }
                if range.is_nan() || range < 0.0 {
                    return Err(MessageError::InvalidOptions(format!("spatial range {range} must be non-negative")));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MessageOptions::default();
        assert_eq!(options.scope, MessageScope::Local);
        assert!(options.immediate);
        assert!(!options.include_sender);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_required_fields() {
        assert!(MessageOptions::entity(EntityId::new(1)).validate().is_ok());
        assert!(MessageOptions::spatial(Vec2::zeros(), 0.0).validate().is_ok());

        let missing_target = MessageOptions {
            scope: MessageScope::Entity,
            ..MessageOptions::local()
        };
        assert!(matches!(missing_target.validate(), Err(MessageError::InvalidOptions(_))));

        let missing_range = MessageOptions {
            range: None,
            ..MessageOptions::spatial(Vec2::zeros(), 1.0)
        };
        assert!(missing_range.validate().is_err());

        assert!(MessageOptions::spatial(Vec2::zeros(), -1.0).validate().is_err());
        assert!(MessageOptions::spatial(Vec2::new(f32::NAN, 0.0), 1.0).validate().is_err());
    }

    #[test]
    fn test_unbounded_range_is_allowed() {
        assert!(MessageOptions::spatial(Vec2::zeros(), f32::INFINITY).validate().is_ok());
    }
}
