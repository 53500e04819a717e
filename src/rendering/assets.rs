//! Sprite cache keyed by logical id.
//!
//! Loads are started when a run begins and polled every frame. Until a sprite
//! is ready, or if it never loads, callers get a fallback shape instead.

use bevy::asset::{LoadState, UntypedAssetId};
use bevy::prelude::*;
use std::collections::HashMap;

use crate::boss::BOSS_ID;
use crate::enemies::EnemyRegistry;

pub const SPRITE_DIR: &str = "sprites";

/// Keys that exist regardless of the enemy roster.
pub const CORE_SPRITES: [&str; 5] = ["player", BOSS_ID, "xp_gem", "potion", "reward_chest"];

/// What to draw when no sprite is available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackShape {
    pub radius: f32,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub enum SpriteVisual {
    Loaded(Handle<Image>),
    Fallback(FallbackShape),
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Pending(Handle<Image>),
    Ready(Handle<Image>),
    Failed,
}

#[derive(Resource, Debug, Default)]
pub struct AssetCache {
    entries: HashMap<String, CacheEntry>,
    initialised: bool,
}

impl AssetCache {
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Track a load that has been started. Keys already tracked are left alone.
    pub fn insert_pending(&mut self, key: impl Into<String>, handle: Handle<Image>) {
        self.entries.entry(key.into()).or_insert(CacheEntry::Pending(handle));
    }

    pub fn mark_loaded(&mut self, key: &str) {
        if let Some(CacheEntry::Pending(handle)) = self.entries.get(key).cloned() {
            self.entries.insert(key.to_string(), CacheEntry::Ready(handle));
        }
    }

    pub fn mark_failed(&mut self, key: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            *entry = CacheEntry::Failed;
        }
    }

    /// Keys still waiting on the asset server, with their handles.
    pub fn pending(&self) -> Vec<(String, UntypedAssetId)> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| match entry {
                CacheEntry::Pending(handle) => Some((key.clone(), handle.id().untyped())),
                _ => None,
            })
            .collect()
    }

    /// The sprite for `key` if it has loaded, otherwise `fallback`.
    pub fn request(&self, key: &str, fallback: FallbackShape) -> SpriteVisual {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(handle)) => SpriteVisual::Loaded(handle.clone()),
            _ => SpriteVisual::Fallback(fallback),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.initialised = false;
    }
}

/// Sprite key for an enemy type; the type id unless the definition names one.
pub fn enemy_sprite_key<'a>(registry: &'a EnemyRegistry, kind: &'a str) -> &'a str {
    match registry.get(kind) {
        Some(def) if !def.sprite.is_empty() => &def.sprite,
        _ => kind,
    }
}

/// Start loading every sprite a run can show.
pub fn init_asset_cache(
    asset_server: Option<Res<AssetServer>>,
    registry: Res<EnemyRegistry>,
    mut cache: ResMut<AssetCache>,
) {
    cache.clear();
    cache.initialised = true;
    let Some(asset_server) = asset_server else {
        warn!("No asset server; drawing fallback shapes only");
        return;
    };

    let mut keys: Vec<String> = CORE_SPRITES.iter().map(|key| key.to_string()).collect();
    keys.extend(
        registry
            .definitions
            .keys()
            .map(|kind| enemy_sprite_key(&registry, kind).to_string()),
    );
    for key in keys {
        let handle = asset_server.load(format!("{}/{}.png", SPRITE_DIR, key));
        cache.insert_pending(key, handle);
    }
    debug!("Requested {} sprites", cache.len());
}

pub fn poll_asset_loads(asset_server: Option<Res<AssetServer>>, mut cache: ResMut<AssetCache>) {
    let Some(asset_server) = asset_server else {
        return;
    };
    for (key, id) in cache.pending() {
        match asset_server.load_state(id) {
            LoadState::Loaded => cache.mark_loaded(&key),
            LoadState::Failed(err) => {
                warn!("Sprite '{}' failed to load ({}); using fallback shape", key, err);
                cache.mark_failed(&key);
            }
            _ => {}
        }
    }
}

pub fn clear_asset_cache(mut cache: ResMut<AssetCache>) {
    cache.clear();
}
