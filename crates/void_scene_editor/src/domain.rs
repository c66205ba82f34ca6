//! Domain entities represented in the scene by generated proxies.
//!
//! Lights, audio sources and presentable markers belong to the document,
//! not to the scene graph. The editor only sees snapshots of them keyed by
//! a stable [`EntityKey`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use void_math::Transform;

use crate::scene::{colors, Color};

/// Stable identity of a domain entity, assigned by the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(pub u64);

impl EntityKey {
    /// Allocate a process-unique key.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Light types, each with its own proxy template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightKind {
    Point,
    Directional,
    Spot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub key: EntityKey,
    pub kind: LightKind,
    pub color: Color,
    pub transform: Transform,
}

impl Light {
    pub fn new(kind: LightKind) -> Self {
        Self {
            key: EntityKey::next(),
            kind,
            color: colors::WHITE,
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AudioSource {
    pub key: EntityKey,
    pub name: String,
    pub transform: Transform,
}

impl AudioSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            key: EntityKey::next(),
            name: name.into(),
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Shape drawn for a presentable marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Presentation {
    #[default]
    Box,
    Sphere,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Presentable {
    pub key: EntityKey,
    pub presentation: Presentation,
    pub transform: Transform,
}

impl Presentable {
    pub fn new(presentation: Presentation) -> Self {
        Self {
            key: EntityKey::next(),
            presentation,
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Snapshot of any proxied domain entity.
#[derive(Clone, Debug, PartialEq)]
pub enum DomainEntity {
    Light(Light),
    Audio(AudioSource),
    Presentable(Presentable),
}

impl DomainEntity {
    pub fn key(&self) -> EntityKey {
        match self {
            DomainEntity::Light(light) => light.key,
            DomainEntity::Audio(audio) => audio.key,
            DomainEntity::Presentable(presentable) => presentable.key,
        }
    }

    pub fn transform(&self) -> Transform {
        match self {
            DomainEntity::Light(light) => light.transform,
            DomainEntity::Audio(audio) => audio.transform,
            DomainEntity::Presentable(presentable) => presentable.transform,
        }
    }

    pub fn set_transform(&mut self, transform: Transform) {
        match self {
            DomainEntity::Light(light) => light.transform = transform,
            DomainEntity::Audio(audio) => audio.transform = transform,
            DomainEntity::Presentable(presentable) => presentable.transform = transform,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DomainEntity::Light(_) => "light",
            DomainEntity::Audio(_) => "audio",
            DomainEntity::Presentable(_) => "presentable",
        }
    }
}

impl From<Light> for DomainEntity {
    fn from(light: Light) -> Self {
        DomainEntity::Light(light)
    }
}

impl From<AudioSource> for DomainEntity {
    fn from(audio: AudioSource) -> Self {
        DomainEntity::Audio(audio)
    }
}

impl From<Presentable> for DomainEntity {
    fn from(presentable: Presentable) -> Self {
        DomainEntity::Presentable(presentable)
    }
}
