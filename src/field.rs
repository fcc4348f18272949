//! Every live firework on screen.

use crate::Rgb;
use crate::audio::ExplosionCue;
use crate::firework::{Firework, Launch, Shape};
use crate::surface::Canvas;

/// Default launches keep at least this far from the left and right edges.
pub const LAUNCH_MARGIN: f32 = 100.0;

pub struct FireworkField {
    width: f32,
    height: f32,
    fireworks: Vec<Firework>,
    rng: fastrand::Rng,
}

impl FireworkField {
    /// An empty field over a `width` by `height` pixel screen.
    pub fn new(width: f32, height: f32, rng: fastrand::Rng) -> Self {
        Self {
            width,
            height,
            fireworks: Vec::new(),
            rng,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        tracing::debug!("Field resized to {width}x{height}");
        self.width = width;
        self.height = height;
    }

    /// Launch a circle firework from a random spot along the bottom edge.
    pub fn spawn_default(&mut self) {
        let x = if self.width > LAUNCH_MARGIN * 2.0 {
            let span = self.width - LAUNCH_MARGIN * 2.0;
            LAUNCH_MARGIN + self.rng.f32() * span
        } else {
            self.width / 2.0
        };
        let y = self.height;
        self.spawn_at(x, y, Shape::Circle);
    }

    /// Launch a firework from an explicit position.
    pub fn spawn_at(&mut self, x: f32, y: f32, shape: Shape) {
        let launch = Launch::random(&mut self.rng);
        let color = Firework::random_color(&mut self.rng);
        self.spawn(Firework::new(x, y, launch, color, shape));
    }

    pub fn spawn(&mut self, firework: Firework) {
        tracing::debug!(
            x = firework.position().0,
            y = firework.position().1,
            shape = ?firework.shape(),
            "Firework launched"
        );
        self.fireworks.push(firework);
    }

    /// Advance every firework by one tick, then drop the burnt out ones.
    pub fn tick<A: ExplosionCue + ?Sized>(&mut self, cue: &A) {
        for firework in &mut self.fireworks {
            firework.update(&mut self.rng, cue);
        }
        self.fireworks.retain(|firework| !firework.is_dead());
    }

    /// Clear to `background`, then draw every firework in launch order.
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C, background: Rgb) {
        canvas.clear(background);
        for firework in &self.fireworks {
            firework.draw(canvas);
        }
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn len(&self) -> usize {
        self.fireworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fireworks.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.fireworks.iter().map(|f| f.particles().len()).sum()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}
