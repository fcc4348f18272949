//! A rocket that climbs until gravity stops it, then bursts into particles.

use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use crate::audio::ExplosionCue;
use crate::particle::Particle;
use crate::surface::Canvas;
use crate::{GRAVITY, Rgb};

/// Radius of the rocket marker while it climbs.
pub const MARKER_RADIUS: f32 = 3.0;

pub const BURST_SIZE: RangeInclusive<usize> = 50..=100;
pub const PARTICLE_LIFE: RangeInclusive<i32> = 20..=40;
pub const PARTICLE_SIZE: RangeInclusive<u32> = 2..=4;
pub const MIN_PARTICLE_SPEED: f32 = 2.0;
pub const MAX_PARTICLE_SPEED: f32 = 6.0;

pub const MIN_LAUNCH_SPEED: f32 = 4.0;
pub const MAX_LAUNCH_SPEED: f32 = 7.0;
/// Largest deviation from straight up, in radians.
pub const LAUNCH_SPREAD: f32 = 0.1;

/// Burst geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shape {
    #[default]
    Circle,
    Heart,
    Star,
}

impl Shape {
    /// Direction (radians, y pointing down) and speed of one particle of a burst.
    /// Every shape keeps speeds inside the particle speed range.
    fn burst_velocity(self, rng: &mut fastrand::Rng) -> (f32, f32) {
        let span = MAX_PARTICLE_SPEED - MIN_PARTICLE_SPEED;
        match self {
            Shape::Circle => (rng.f32() * TAU, MIN_PARTICLE_SPEED + rng.f32() * span),
            Shape::Heart => {
                let t = rng.f32() * TAU;
                // Heart shape parametric equations, flipped for a downward y axis
                let hx = 16.0 * t.sin().powi(3);
                let hy = -(13.0 * t.cos()
                    - 5.0 * (2.0 * t).cos()
                    - 2.0 * (3.0 * t).cos()
                    - (4.0 * t).cos());
                let reach = (hx.hypot(hy) / 17.0).clamp(0.0, 1.0);
                (hy.atan2(hx), MIN_PARTICLE_SPEED + reach * span)
            }
            Shape::Star => {
                let angle = rng.f32() * TAU;
                // Five spikes, one of them pointing straight up
                let spike = (0.5 + 0.5 * (5.0 * (angle + FRAC_PI_2)).cos()).powi(2);
                (angle, MIN_PARTICLE_SPEED + spike * span)
            }
        }
    }
}

/// Initial heading of a rocket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    /// Radians; `-FRAC_PI_2` is straight up.
    pub angle: f32,
    /// Pixels per tick.
    pub speed: f32,
}

impl Launch {
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self {
            angle: -FRAC_PI_2 - LAUNCH_SPREAD + rng.f32() * LAUNCH_SPREAD * 2.0,
            speed: MIN_LAUNCH_SPEED + rng.f32() * (MAX_LAUNCH_SPEED - MIN_LAUNCH_SPEED),
        }
    }

    pub fn straight_up(speed: f32) -> Self {
        Self {
            angle: -FRAC_PI_2,
            speed,
        }
    }
}

#[derive(Debug)]
enum State {
    Ascending,
    Exploded { particles: Vec<Particle> },
}

#[derive(Debug)]
pub struct Firework {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    launch_vy: f32,
    climb_ticks: u32,
    color: Rgb,
    shape: Shape,
    state: State,
}

impl Firework {
    pub fn new(x: f32, y: f32, launch: Launch, color: Rgb, shape: Shape) -> Self {
        let vy = launch.angle.sin() * launch.speed;
        Self {
            x,
            y,
            vx: launch.angle.cos() * launch.speed,
            vy,
            launch_vy: vy,
            climb_ticks: 0,
            color,
            shape,
            state: State::Ascending,
        }
    }

    /// A bright colour: every channel in 128..=255.
    pub fn random_color(rng: &mut fastrand::Rng) -> Rgb {
        (rng.u8(128..=255), rng.u8(128..=255), rng.u8(128..=255))
    }

    pub fn update<A: ExplosionCue + ?Sized>(&mut self, rng: &mut fastrand::Rng, cue: &A) {
        if let State::Exploded { particles } = &mut self.state {
            particles.retain_mut(|particle| {
                particle.update();
                !particle.is_dead()
            });
            return;
        }

        self.x += self.vx;
        self.y += self.vy;
        // Recomputed from the tick count so rounding can never push the apex a tick late
        self.climb_ticks += 1;
        self.vy = self.launch_vy + GRAVITY * self.climb_ticks as f32;

        if self.vy >= 0.0 {
            self.explode(rng, cue);
        }
    }

    /// Burst into particles. Only the first call has any effect.
    pub fn explode<A: ExplosionCue + ?Sized>(&mut self, rng: &mut fastrand::Rng, cue: &A) {
        if self.is_exploded() {
            return;
        }

        let count = rng.usize(BURST_SIZE);
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let (angle, speed) = self.shape.burst_velocity(rng);
            let size = rng.u32(PARTICLE_SIZE) as f32;
            let life = rng.i32(PARTICLE_LIFE);
            particles.push(Particle::new(
                rng,
                (self.x, self.y),
                (angle, speed),
                self.color,
                size,
                life,
            ));
        }

        tracing::debug!(
            x = self.x,
            y = self.y,
            shape = ?self.shape,
            particles = count,
            "Firework exploded"
        );
        self.state = State::Exploded { particles };
        cue.play_explosion_cue();
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        match &self.state {
            State::Ascending => {
                canvas.fill_circle(self.x, self.y, MARKER_RADIUS, self.color, 255);
            }
            State::Exploded { particles } => {
                for particle in particles {
                    particle.draw(canvas);
                }
            }
        }
    }

    /// Exploded with every particle burnt out.
    pub fn is_dead(&self) -> bool {
        matches!(&self.state, State::Exploded { particles } if particles.is_empty())
    }

    pub fn is_exploded(&self) -> bool {
        matches!(self.state, State::Exploded { .. })
    }

    pub fn particles(&self) -> &[Particle] {
        match &self.state {
            State::Ascending => &[],
            State::Exploded { particles } => particles,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }
}
