//! Player-centred camera in world space.
//!
//! World and screen coordinates both grow right and down. The camera centre is
//! kept far enough from the edges that the view never shows outside the world.

use bevy::prelude::*;

use super::data::WorldBalance;

#[derive(Resource, Debug, Clone)]
pub struct GameCamera {
    /// Camera centre in world coordinates.
    pub center: Vec2,
    pub screen_size: Vec2,
    pub world_size: Vec2,
    pub zoom: f32,
}

impl Default for GameCamera {
    fn default() -> Self {
        Self::from_balance(&WorldBalance::default())
    }
}

impl GameCamera {
    pub fn from_balance(world: &WorldBalance) -> Self {
        let world_size = Vec2::new(world.width, world.height);
        Self {
            center: world_size / 2.0,
            screen_size: Vec2::new(world.screen_width, world.screen_height),
            world_size,
            zoom: if world.camera_zoom > 0.0 { world.camera_zoom } else { 1.0 },
        }
    }

    /// Half of the visible world extent.
    pub fn half_view(&self) -> Vec2 {
        self.screen_size / self.zoom / 2.0
    }

    pub fn follow(&mut self, target: Vec2) {
        self.center = target;
        self.clamp_to_world();
    }

    fn clamp_to_world(&mut self) {
        let half = self.half_view();
        // A view wider than the world just centres on it.
        self.center.x = if half.x * 2.0 >= self.world_size.x {
            self.world_size.x / 2.0
        } else {
            self.center.x.clamp(half.x, self.world_size.x - half.x)
        };
        self.center.y = if half.y * 2.0 >= self.world_size.y {
            self.world_size.y / 2.0
        } else {
            self.center.y.clamp(half.y, self.world_size.y - half.y)
        };
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.center) * self.zoom + self.screen_size / 2.0
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.screen_size / 2.0) / self.zoom + self.center
    }

    /// Visible world rectangle as (min, max).
    pub fn visible_rect(&self) -> (Vec2, Vec2) {
        let half = self.half_view();
        (self.center - half, self.center + half)
    }

    pub fn resize(&mut self, screen_size: Vec2) {
        self.screen_size = screen_size;
        self.clamp_to_world();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> GameCamera {
        GameCamera {
            center: Vec2::ZERO,
            screen_size: Vec2::new(800.0, 600.0),
            world_size: Vec2::new(2000.0, 1500.0),
            zoom: 1.0,
        }
    }

    #[test]
    fn follow_clamps_to_world_edges() {
        let mut cam = camera();
        cam.follow(Vec2::new(10.0, 10.0));
        assert_eq!(cam.center, Vec2::new(400.0, 300.0));
        cam.follow(Vec2::new(1990.0, 1490.0));
        assert_eq!(cam.center, Vec2::new(1600.0, 1200.0));
        cam.follow(Vec2::new(1000.0, 700.0));
        assert_eq!(cam.center, Vec2::new(1000.0, 700.0));
    }

    #[test]
    fn screen_and_world_round_trip_with_zoom() {
        let mut cam = camera();
        cam.zoom = 0.5;
        cam.follow(Vec2::new(1000.0, 750.0));
        let world = Vec2::new(1100.0, 700.0);
        let screen = cam.world_to_screen(world);
        assert_eq!(screen, Vec2::new(450.0, 275.0));
        assert_eq!(cam.screen_to_world(screen), world);
    }
}
