use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

/// Platform name, relative cost per click, click-through rate, conversion rate.
const PLATFORMS: [(&str, f64, f64, f64); 4] = [
    ("Google", 1.20, 0.045, 0.060),
    ("Meta", 0.85, 0.012, 0.035),
    ("TikTok", 0.55, 0.009, 0.020),
    ("LinkedIn", 3.10, 0.006, 0.045),
];

const CAMPAIGNS: [&str; 6] = [
    "Brand Search",
    "Spring Sale",
    "Retargeting",
    "Prospecting",
    "App Installs",
    "Lead Gen",
];

const DAYS: i64 = 60;
const CAMPAIGNS_PER_PLATFORM: usize = 2;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let money = Format::new().set_num_format("#,##0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Performance")?;
    let headers = [
        "Date",
        "Platform",
        "Campaign",
        "Impressions",
        "Clicks",
        "Cost",
        "Conversions",
    ];
    for (c, h) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, *h, &header)?;
    }

    let mut row: u32 = 1;
    for day in 0..DAYS {
        let date = start + Duration::days(day);
        let excel_date =
            ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
        // Weekends run a little hotter.
        let seasonality = if date.weekday().number_from_monday() >= 6 {
            1.25
        } else {
            1.0
        };

        for (p, &(platform, cpc, ctr, cvr)) in PLATFORMS.iter().enumerate() {
            // Each platform runs a rotating pair of campaigns.
            for k in 0..CAMPAIGNS_PER_PLATFORM {
                let campaign = CAMPAIGNS[(p + k * 3) % CAMPAIGNS.len()];
                let impressions = (rng.uniform(8_000.0, 60_000.0) * seasonality).round();
                let clicks = (impressions * ctr * rng.uniform(0.7, 1.3)).round();
                let cost = clicks * cpc * rng.uniform(0.85, 1.15);
                let conversions = (clicks * cvr * rng.uniform(0.5, 1.5)).round();

                sheet.write_datetime_with_format(row, 0, &excel_date, &date_format)?;
                sheet.write_string(row, 1, platform)?;
                sheet.write_string(row, 2, campaign)?;
                sheet.write_number(row, 3, impressions)?;
                sheet.write_number(row, 4, clicks)?;
                sheet.write_number_with_format(row, 5, (cost * 100.0).round() / 100.0, &money)?;
                sheet.write_number(row, 6, conversions)?;
                row += 1;
            }
        }
    }
    sheet.autofit();

    let output_path = "sample_paid_media.xlsx";
    workbook
        .save(output_path)
        .with_context(|| format!("writing {output_path}"))?;

    println!("{}", summary_line(row - 1, output_path));
    Ok(())
}

fn summary_line(rows: u32, output_path: &str) -> String {
    format!(
        "Wrote {rows} rows ({DAYS} days × {} platforms × {CAMPAIGNS_PER_PLATFORM} campaigns each) to {output_path}",
        PLATFORMS.len()
    )
}
