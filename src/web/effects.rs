//! Presentation-only reactions to game events: canvas particle bursts and
//! short oscillator tones. Nothing here feeds back into game logic.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AudioContext, CanvasRenderingContext2d, HtmlCanvasElement};

struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    born_ms: f64,
    life_ms: f64,
    color: &'static str,
}

pub struct EffectsLayer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    particles: Vec<Particle>,
    audio: Option<AudioContext>,
    // Poor man's RNG for particle spread; effects need no statistical quality.
    jitter: u32,
}

impl EffectsLayer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        Ok(Self {
            canvas,
            ctx,
            particles: Vec::new(),
            audio: None,
            jitter: 0x9e37_79b9,
        })
    }

    fn next_jitter(&mut self) -> f64 {
        // xorshift step, mapped to [0, 1)
        let mut x = self.jitter;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.jitter = x;
        f64::from(x) / f64::from(u32::MAX)
    }

    /// Spawn a radial burst at the center of the effects canvas.
    pub fn burst(&mut self, color: &'static str, count: usize, now: f64) {
        let cx = self.canvas.width() as f64 / 2.0;
        let cy = self.canvas.height() as f64 / 2.0;
        for _ in 0..count {
            let angle = self.next_jitter() * std::f64::consts::TAU;
            let speed = 40.0 + self.next_jitter() * 120.0;
            let life = 400.0 + self.next_jitter() * 400.0;
            self.particles.push(Particle {
                x: cx,
                y: cy,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                born_ms: now,
                life_ms: life,
                color,
            });
        }
    }

    /// Advance and draw the particle field. Called from the rAF loop.
    pub fn render(&mut self, now: f64) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        self.particles.retain(|p| now - p.born_ms < p.life_ms);
        for p in &self.particles {
            let age = (now - p.born_ms) / 1000.0;
            let alpha = 1.0 - ((now - p.born_ms) / p.life_ms).clamp(0.0, 1.0);
            let x = p.x + p.vx * age;
            let y = p.y + p.vy * age + 60.0 * age * age; // light gravity
            self.ctx.set_global_alpha(alpha);
            self.ctx.set_fill_style_str(p.color);
            self.ctx.fill_rect(x - 2.5, y - 2.5, 5.0, 5.0);
        }
        self.ctx.set_global_alpha(1.0);
    }

    /// Short sine blip. The AudioContext is created lazily on first use so it
    /// starts after a user gesture, as browsers require.
    pub fn tone(&mut self, freq: f32, duration_ms: f64) {
        if self.audio.is_none() {
            self.audio = AudioContext::new().ok();
        }
        let Some(audio) = &self.audio else { return };
        let now = audio.current_time();
        let secs = duration_ms / 1000.0;
        if let (Ok(osc), Ok(gain)) = (audio.create_oscillator(), audio.create_gain()) {
            osc.set_type(web_sys::OscillatorType::Sine);
            osc.frequency().set_value(freq);
            gain.gain().set_value(0.08);
            let _ = gain.gain().linear_ramp_to_value_at_time(0.0, now + secs);
            let _ = osc.connect_with_audio_node(&gain);
            let _ = gain.connect_with_audio_node(&audio.destination());
            let _ = osc.start();
            let _ = osc.stop_with_when(now + secs);
        }
    }
}
