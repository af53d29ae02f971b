// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::ecs::EntityId;

/// The entity that owns a simulation body.
///
/// Written once when the body is created and never changed afterwards. A tag
/// with no entity marks a body nothing in the registry owns (the static body,
/// engine-internal helpers) and such bodies are skipped during writeback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BodyTag(Option<EntityId>);

impl BodyTag {
    /// A tag with no owning entity.
    pub const NONE: BodyTag = BodyTag(None);

    /// Bit 64 of the packed form marks a present entity.
    const PRESENT: u128 = 1 << 64;

    /// Tags a body as owned by `entity`.
    pub const fn for_entity(entity: EntityId) -> Self {
        BodyTag(Some(entity))
    }

    /// The owning entity, if any.
    pub const fn entity(self) -> Option<EntityId> {
        self.0
    }

    /// Whether the tag names no entity.
    pub const fn is_none(self) -> bool {
        self.0.is_none()
    }

    /// Packs the tag into an engine's 128-bit user data slot.
    ///
    /// Entity bits occupy the low 64 bits and bit 64 flags presence, so an
    /// untouched slot (zero) decodes to [`BodyTag::NONE`].
    pub const fn to_user_data(self) -> u128 {
        match self.0 {
            Some(entity) => Self::PRESENT | entity.to_bits() as u128,
            None => 0,
        }
    }

    /// Decodes a tag packed with [`BodyTag::to_user_data`].
    pub const fn from_user_data(raw: u128) -> Self {
        if raw & Self::PRESENT == 0 {
            BodyTag::NONE
        } else {
            BodyTag(Some(EntityId::from_bits(raw as u64)))
        }
    }
}

impl From<EntityId> for BodyTag {
    fn from(entity: EntityId) -> Self {
        BodyTag::for_entity(entity)
    }
}
