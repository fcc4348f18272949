use crate::surface::Canvas;
use crate::{GRAVITY, Rgb};

/// Largest horizontal drift a particle can pick up per tick, in either direction.
pub const MAX_WIND: f32 = 0.2;

/// A single spark of a burst. It fades out linearly over its life.
#[derive(Clone, Debug)]
pub struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    wind: f32,
    color: Rgb,
    size: f32,
    life: i32,
    max_life: i32,
    alpha: u8,
}

impl Particle {
    /// Launch a particle from `origin` with `heading` as `(angle, speed)`: radians and
    /// pixels per tick. The wind it drifts with is drawn from `rng`.
    pub fn new(
        rng: &mut fastrand::Rng,
        origin: (f32, f32),
        heading: (f32, f32),
        color: Rgb,
        size: f32,
        life: i32,
    ) -> Self {
        let (x, y) = origin;
        let (angle, speed) = heading;
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            wind: -MAX_WIND + rng.f32() * MAX_WIND * 2.0,
            color,
            size,
            life,
            max_life: life,
            alpha: 255,
        }
    }

    pub fn update(&mut self) {
        self.vy += GRAVITY;
        self.vx += self.wind;
        self.x += self.vx;
        self.y += self.vy;
        self.life -= 1;
        self.alpha = Self::fade(self.life, self.max_life);
    }

    fn fade(life: i32, max_life: i32) -> u8 {
        if max_life <= 0 {
            return 0;
        }
        (255 * life / max_life).clamp(0, 255) as u8
    }

    /// Dead particles are pruned by their firework before drawing, so this never sees
    /// one in practice; a fully faded particle draws nothing anyway.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.fill_circle(self.x, self.y, self.size, self.color, self.alpha);
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }

    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    pub fn wind(&self) -> f32 {
        self.wind
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn life(&self) -> i32 {
        self.life
    }

    pub fn max_life(&self) -> i32 {
        self.max_life
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }
}
