//! The scene graph: one primary sprite and an optional label.

use log::debug;

use super::element::{Animatable, Label, Sprite};
use crate::tween::Property;

/// Addresses one of the two slots in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementId {
    Primary,
    Label,
}

/// Holds the visuals drawn on the surface.
///
/// The graph has exactly two slots. Mutation only happens on the event-loop
/// thread, so no locking is involved.
#[derive(Debug, Default)]
pub struct SceneGraph {
    primary: Option<Sprite>,
    label: Option<Label>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the primary sprite, replacing any previous one.
    pub fn add_primary(&mut self, sprite: Sprite) -> ElementId {
        if self.primary.replace(sprite).is_some() {
            debug!("replaced primary sprite");
        }
        ElementId::Primary
    }

    /// Insert the label, replacing any previous one.
    pub fn add_label(&mut self, label: Label) -> ElementId {
        if self.label.replace(label).is_some() {
            debug!("replaced label");
        }
        ElementId::Label
    }

    pub fn remove_primary(&mut self) -> Option<Sprite> {
        self.primary.take()
    }

    pub fn remove_label(&mut self) -> Option<Label> {
        self.label.take()
    }

    pub fn primary(&self) -> Option<&Sprite> {
        self.primary.as_ref()
    }

    pub fn primary_mut(&mut self) -> Option<&mut Sprite> {
        self.primary.as_mut()
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    pub fn label_mut(&mut self) -> Option<&mut Label> {
        self.label.as_mut()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        match id {
            ElementId::Primary => self.primary.is_some(),
            ElementId::Label => self.label.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.label.is_none()
    }

    /// Read an animatable property of an element.
    pub fn get(&self, id: ElementId, property: Property) -> Option<f32> {
        match id {
            ElementId::Primary => self.primary.as_ref().map(|s| s.get(property)),
            ElementId::Label => self.label.as_ref().map(|l| l.get(property)),
        }
    }

    /// Write an animatable property. Returns `false` if the element is gone.
    pub fn set(&mut self, id: ElementId, property: Property, value: f32) -> bool {
        match id {
            ElementId::Primary => match &mut self.primary {
                Some(sprite) => {
                    sprite.set(property, value);
                    true
                }
                None => false,
            },
            ElementId::Label => match &mut self.label {
                Some(label) => {
                    label.set(property, value);
                    true
                }
                None => false,
            },
        }
    }

    /// Advance flip-book playback.
    pub fn update(&mut self, dt: f32) {
        if let Some(sprite) = &mut self.primary {
            sprite.advance(dt);
        }
    }
}
