use super::primitives::Color;
use palette::{Mix, Srgb, Srgba, WithAlpha};

pub struct WatchColors {
    pub background: Color,
    pub hand: Color,
    pub tick: Color,
    pub center_circle: Color,
    pub gauge: Color,
    pub wind_marker: Color,
    pub orrery: Color,
    pub orbit: Color,
    pub rain_tick: Color,
    pub snow_tick: Color,
    pub rain_day: Color,
    pub rain_night: Color,
    pub snow_day: Color,
    pub snow_night: Color,
    pub clear_day: Color,
    pub cloudy_day: Color,
    pub clear_night: Color,
    pub cloudy_night: Color,
    pub star: Color,
    pub temperature_graph: Color,
    pub pressure_graph: Color,
    pub label: Color,
    pub calendar: Vec<Color>,
}

impl Default for WatchColors {
    fn default() -> Self {
        Self {
            background: rgb(0x000000),
            hand: rgb(0xffffff),
            tick: rgb(0xffffff),
            center_circle: rgb(0xffffff),
            gauge: Srgba::new(0.3, 0.3, 0.3, 1.0),
            wind_marker: rgb(0x9e9e9e),
            orrery: Srgba::new(1.0, 1.0, 1.0, 0.35),
            orbit: Srgba::new(1.0, 1.0, 1.0, 0.08),
            rain_tick: rgb(0x2196f3),
            snow_tick: rgb(0xe1f5fe),
            rain_day: rgb(0x1e88e5),
            rain_night: rgb(0x0d47a1),
            snow_day: rgb(0xeceff1),
            snow_night: rgb(0x90a4ae),
            clear_day: rgb(0x4fc3f7),
            cloudy_day: rgb(0x9e9e9e),
            clear_night: rgb(0x1a237e),
            cloudy_night: rgb(0x424242),
            star: rgb(0xfff9c4),
            temperature_graph: Srgba::new(1.0, 0.44, 0.26, 0.8),
            pressure_graph: Srgba::new(0.5, 0.87, 0.92, 0.8),
            label: rgb(0xffffff),
            calendar: default_calendar_colors(),
        }
    }
}

impl WatchColors {
    /// Calendar lane colors from hex strings; invalid entries are skipped and
    /// an empty result falls back to the defaults.
    pub fn with_calendar_colors(mut self, hex: &[String]) -> Self {
        let parsed: Vec<Color> = hex
            .iter()
            .filter_map(|h| {
                parse_hex(h).or_else(|| {
                    log::warn!("Ignoring invalid calendar color '{}'", h);
                    None
                })
            })
            .collect();
        if !parsed.is_empty() {
            self.calendar = parsed;
        }
        self
    }
}

fn default_calendar_colors() -> Vec<Color> {
    vec![rgb(0xff7043), rgb(0x66bb6a), rgb(0xab47bc)]
}

pub fn rgb(hex: u32) -> Color {
    Srgb::<u8>::from(hex).into_format::<f64>().with_alpha(1.0)
}

pub fn parse_hex(s: &str) -> Option<Color> {
    let rgb: Srgb<u8> = s.trim().parse().ok()?;
    Some(rgb.into_format::<f64>().with_alpha(1.0))
}

/// Linear blend in sRGB; `t` is clamped to [0, 1] and NaN picks `from`.
pub fn mix(from: Color, to: Color, t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t };
    from.mix(to, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_endpoints_and_clamp() {
        let black = rgb(0x000000);
        let white = rgb(0xffffff);
        assert_eq!(mix(black, white, 0.0), black);
        assert_eq!(mix(black, white, 1.0), white);
        assert_eq!(mix(black, white, 7.0), white);
        assert_eq!(mix(black, white, f64::NAN), black);
        let (r, _, _, _) = mix(black, white, 0.25).into_components();
        assert!((r - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_calendar_colors_from_hex() {
        let colors = WatchColors::default()
            .with_calendar_colors(&["#ff0000".to_string(), "nope".to_string()]);
        assert_eq!(colors.calendar, vec![rgb(0xff0000)]);

        let fallback = WatchColors::default().with_calendar_colors(&[]);
        assert_eq!(fallback.calendar.len(), 3);
    }
}
