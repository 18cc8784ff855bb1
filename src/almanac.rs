//! # Built-in Low-Precision Almanac
//!
//! A closed-form [`Ephemeris`] implementation good to a few hundredths of a degree
//! for the Sun and about a tenth of a degree for the Moon over a few centuries
//! around J2000. That is far below the size of a field of view or the granularity
//! of a 15-minute sample grid, which is all the visibility engine needs.
//!
//! ## Algorithms (Meeus, *Astronomical Algorithms*, 2nd ed.)
//! - **Time**: Julian day straight from Unix milliseconds, UT ≈ TT (ΔT ignored)
//! - **Sidereal time**: IAU 1982 GMST polynomial (ch. 12) plus equation of the equinoxes
//! - **Precession**: IAU 1976 ζ, z, θ from J2000 to date (ch. 21)
//! - **Nutation**: four-term Δψ, Δε series (ch. 22)
//! - **Aberration**: annual term with κ = 20.49552″, e-terms dropped (ch. 23)
//! - **Sun**: geometric mean longitude plus equation of centre (ch. 25)
//! - **Moon**: 20 largest longitude/distance and latitude terms of ELP-2000/82 (ch. 47),
//!   corrected to topocentric with the observer's parallax factors (ch. 40)
//! - **Illumination**: phase angle from geocentric elongation (ch. 48)
//!
//! No atmospheric refraction is applied; altitudes are geometric.

use crate::ephemeris::{
    Body, Ephemeris, EquatorialCoords, HorizontalCoords, MoonIllumination, ObserverFrame,
    RiseSetDirection, EARTH_RADIUS_M,
};
use crate::VisibilityError;
use chrono::{DateTime, Duration, Utc};

const J2000: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const DAYS_PER_CENTURY: f64 = 36_525.0;
const AU_KM: f64 = 149_597_870.7;
const ARCSEC: f64 = 1.0 / 3600.0;
const ABERRATION_ARCSEC: f64 = 20.495_52;

/// Rise/set scan: coarse step, horizon of the search, bisection limits.
const SCAN_STEP_MINUTES: i64 = 10;
const SCAN_SPAN_MINUTES: i64 = 24 * 60;
const MAX_BISECTIONS: usize = 40;
const CONVERGENCE_MS: i64 = 1000;

// Periodic terms for the Moon's longitude and distance (Meeus table 47.A).
// (D, M, M', F, Σl in 1e-6 degrees, Σr in 1e-3 km)
const MOON_LR_TERMS: [(f64, f64, f64, f64, f64, f64); 20] = [
    (0.0, 0.0, 1.0, 0.0, 6_288_774.0, -20_905_355.0),
    (2.0, 0.0, -1.0, 0.0, 1_274_027.0, -3_699_111.0),
    (2.0, 0.0, 0.0, 0.0, 658_314.0, -2_955_968.0),
    (0.0, 0.0, 2.0, 0.0, 213_618.0, -569_925.0),
    (0.0, 1.0, 0.0, 0.0, -185_116.0, 48_888.0),
    (0.0, 0.0, 0.0, 2.0, -114_332.0, -3_149.0),
    (2.0, 0.0, -2.0, 0.0, 58_793.0, 246_158.0),
    (2.0, -1.0, -1.0, 0.0, 57_066.0, -152_138.0),
    (2.0, 0.0, 1.0, 0.0, 53_322.0, -170_733.0),
    (2.0, -1.0, 0.0, 0.0, 45_758.0, -204_586.0),
    (0.0, 1.0, -1.0, 0.0, -40_923.0, -129_620.0),
    (1.0, 0.0, 0.0, 0.0, -34_720.0, 108_743.0),
    (0.0, 1.0, 1.0, 0.0, -30_383.0, 104_755.0),
    (2.0, 0.0, 0.0, -2.0, 15_327.0, 10_321.0),
    (0.0, 0.0, 1.0, 2.0, -12_528.0, 0.0),
    (0.0, 0.0, 1.0, -2.0, 10_980.0, 79_661.0),
    (4.0, 0.0, -1.0, 0.0, 10_675.0, -34_782.0),
    (0.0, 0.0, 3.0, 0.0, 10_034.0, -23_210.0),
    (4.0, 0.0, -2.0, 0.0, 8_548.0, -21_636.0),
    (2.0, 1.0, -1.0, 0.0, -7_888.0, 24_208.0),
];

// Periodic terms for the Moon's latitude (Meeus table 47.B).
// (D, M, M', F, Σb in 1e-6 degrees)
const MOON_B_TERMS: [(f64, f64, f64, f64, f64); 20] = [
    (0.0, 0.0, 0.0, 1.0, 5_128_122.0),
    (0.0, 0.0, 1.0, 1.0, 280_602.0),
    (0.0, 0.0, 1.0, -1.0, 277_693.0),
    (2.0, 0.0, 0.0, -1.0, 173_237.0),
    (2.0, 0.0, -1.0, 1.0, 55_413.0),
    (2.0, 0.0, -1.0, -1.0, 46_271.0),
    (2.0, 0.0, 0.0, 1.0, 32_573.0),
    (0.0, 0.0, 2.0, 1.0, 17_198.0),
    (2.0, 0.0, 1.0, -1.0, 9_266.0),
    (0.0, 0.0, 2.0, -1.0, 8_822.0),
    (2.0, -1.0, 0.0, -1.0, 8_216.0),
    (2.0, 0.0, -2.0, -1.0, 4_324.0),
    (2.0, 0.0, 1.0, 1.0, 4_200.0),
    (2.0, 1.0, 0.0, -1.0, -3_359.0),
    (2.0, -1.0, -1.0, 1.0, 2_463.0),
    (2.0, -1.0, 0.0, 1.0, 2_211.0),
    (2.0, -1.0, -1.0, -1.0, 2_065.0),
    (0.0, 1.0, -1.0, -1.0, -1_870.0),
    (4.0, 0.0, -1.0, -1.0, 1_828.0),
    (0.0, 1.0, 0.0, 1.0, -1_794.0),
];

/// The built-in ephemeris. Zero-sized, `Copy`, and safe to share across threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Almanac;

/// Julian day (UT) of an instant.
pub fn julian_day(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

fn julian_centuries(jd: f64) -> f64 {
    (jd - J2000) / DAYS_PER_CENTURY
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Greenwich mean sidereal time in degrees.
pub fn greenwich_mean_sidereal_deg(jd: f64) -> f64 {
    let t = julian_centuries(jd);
    normalize_degrees(
        280.460_618_37 + 360.985_647_366_29 * (jd - J2000) + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Nutation in longitude and obliquity, degrees.
#[derive(Clone, Copy, Debug)]
struct Nutation {
    longitude: f64,
    obliquity: f64,
    mean_obliquity: f64,
}

impl Nutation {
    fn at(t: f64) -> Self {
        let omega = (125.044_52 - 1_934.136_261 * t).to_radians();
        let l_sun = (280.4665 + 36_000.7698 * t).to_radians();
        let l_moon = (218.3165 + 481_267.8813 * t).to_radians();

        let dpsi = -17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin()
            - 0.23 * (2.0 * l_moon).sin()
            + 0.21 * (2.0 * omega).sin();
        let deps = 9.20 * omega.cos() + 0.57 * (2.0 * l_sun).cos()
            + 0.10 * (2.0 * l_moon).cos()
            - 0.09 * (2.0 * omega).cos();

        let mean_obliquity =
            23.439_291_111 - (46.8150 * t + 0.000_59 * t * t - 0.001_813 * t * t * t) * ARCSEC;

        Nutation {
            longitude: dpsi * ARCSEC,
            obliquity: deps * ARCSEC,
            mean_obliquity,
        }
    }

    fn true_obliquity(&self) -> f64 {
        self.mean_obliquity + self.obliquity
    }
}

fn apparent_sidereal_deg(jd: f64, nutation: &Nutation) -> f64 {
    let equation_of_equinoxes = nutation.longitude * nutation.true_obliquity().to_radians().cos();
    normalize_degrees(greenwich_mean_sidereal_deg(jd) + equation_of_equinoxes)
}

/// Precess a J2000 place to the equinox of date; angles in degrees.
fn precess_from_j2000(ra_deg: f64, dec_deg: f64, t: f64) -> (f64, f64) {
    let zeta = ((2306.2181 * t + 0.301_88 * t * t + 0.017_998 * t * t * t) * ARCSEC).to_radians();
    let z = ((2306.2181 * t + 1.094_68 * t * t + 0.018_203 * t * t * t) * ARCSEC).to_radians();
    let theta = ((2004.3109 * t - 0.426_65 * t * t - 0.041_833 * t * t * t) * ARCSEC).to_radians();

    let ra = ra_deg.to_radians();
    let dec = dec_deg.to_radians();

    let a = dec.cos() * (ra + zeta).sin();
    let b = theta.cos() * dec.cos() * (ra + zeta).cos() - theta.sin() * dec.sin();
    let c = theta.sin() * dec.cos() * (ra + zeta).cos() + theta.cos() * dec.sin();

    let ra_out = (a.atan2(b) + z).to_degrees();
    let dec_out = c.atan2((a * a + b * b).sqrt()).to_degrees();
    (normalize_degrees(ra_out), dec_out)
}

/// Nutation plus annual aberration offsets (Δα, Δδ) in degrees.
fn apparent_offsets(
    ra_deg: f64,
    dec_deg: f64,
    nutation: &Nutation,
    sun_lon_deg: f64,
) -> (f64, f64) {
    let eps = nutation.true_obliquity().to_radians();
    let (sin_ra, cos_ra) = ra_deg.to_radians().sin_cos();
    let dec = dec_deg.to_radians();
    let (sin_sun, cos_sun) = sun_lon_deg.to_radians().sin_cos();
    let kappa = ABERRATION_ARCSEC * ARCSEC;

    let d_dec = eps.sin() * cos_ra * nutation.longitude + sin_ra * nutation.obliquity
        - kappa
            * (cos_sun * eps.cos() * (eps.tan() * dec.cos() - sin_ra * dec.sin())
                + cos_ra * dec.sin() * sin_sun);

    // RA is undefined at the celestial poles
    if dec.cos().abs() < 1e-9 {
        return (0.0, d_dec);
    }

    let d_ra = (eps.cos() + eps.sin() * sin_ra * dec.tan()) * nutation.longitude
        - cos_ra * dec.tan() * nutation.obliquity
        - kappa * (cos_ra * cos_sun * eps.cos() + sin_ra * sin_sun) / dec.cos();

    (d_ra, d_dec)
}

#[derive(Clone, Copy, Debug)]
struct SolarCoords {
    apparent_longitude: f64,
    distance_au: f64,
}

fn solar_coords(t: f64) -> SolarCoords {
    let l0 = 280.466_46 + t * (36_000.769_83 + t * 0.000_303_2);
    let m = 357.529_11 + t * (35_999.050_29 - t * 0.000_153_7);
    let e = 0.016_708_634 - t * (0.000_042_037 + t * 0.000_000_126_7);
    let m_rad = m.to_radians();

    let center = m_rad.sin() * (1.914_602 - t * (0.004_817 + t * 0.000_014))
        + (2.0 * m_rad).sin() * (0.019_993 - t * 0.000_101)
        + (3.0 * m_rad).sin() * 0.000_289;

    let true_longitude = l0 + center;
    let anomaly = (m + center).to_radians();
    let distance_au = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * anomaly.cos());

    let omega = (125.04 - 1_934.136 * t).to_radians();
    SolarCoords {
        apparent_longitude: normalize_degrees(true_longitude - 0.005_69 - 0.004_78 * omega.sin()),
        distance_au,
    }
}

/// Ecliptic longitude/latitude (degrees) → RA/Dec (degrees).
fn ecliptic_to_equatorial(lon_deg: f64, lat_deg: f64, obliquity_deg: f64) -> (f64, f64) {
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    let eps = obliquity_deg.to_radians();

    let ra = (lon.sin() * eps.cos() - lat.tan() * eps.sin()).atan2(lon.cos());
    let dec = (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin()).asin();
    (normalize_degrees(ra.to_degrees()), dec.to_degrees())
}

/// Geometric ecliptic longitude, latitude (degrees) and distance (km) of the Moon.
fn moon_ecliptic(t: f64) -> (f64, f64, f64) {
    let lp = normalize_degrees(
        218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t * t + t * t * t / 538_841.0
            - t * t * t * t / 65_194_000.0,
    );
    let d = normalize_degrees(
        297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t * t + t * t * t / 545_868.0
            - t * t * t * t / 113_065_000.0,
    );
    let m = normalize_degrees(
        357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t * t + t * t * t / 24_490_000.0,
    );
    let mp = normalize_degrees(
        134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t * t + t * t * t / 69_699.0
            - t * t * t * t / 14_712_000.0,
    );
    let f = normalize_degrees(
        93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t * t - t * t * t / 3_526_000.0
            + t * t * t * t / 863_310_000.0,
    );

    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t * t;
    let eccentricity_factor = |tm: f64| match tm.abs() as i32 {
        1 => e,
        2 => e * e,
        _ => 1.0,
    };

    let (mut sum_l, mut sum_r) = (0.0_f64, 0.0_f64);
    for &(td, tm, tmp, tf, cl, cr) in &MOON_LR_TERMS {
        let arg = (td * d + tm * m + tmp * mp + tf * f).to_radians();
        let scale = eccentricity_factor(tm);
        sum_l += cl * scale * arg.sin();
        sum_r += cr * scale * arg.cos();
    }

    let mut sum_b = 0.0_f64;
    for &(td, tm, tmp, tf, cb) in &MOON_B_TERMS {
        let arg = (td * d + tm * m + tmp * mp + tf * f).to_radians();
        sum_b += cb * eccentricity_factor(tm) * arg.sin();
    }

    let a1 = (119.75 + 131.849 * t).to_radians();
    let a2 = (53.09 + 479_264.290 * t).to_radians();
    let a3 = (313.45 + 481_266.484 * t).to_radians();
    let (lp_r, f_r, mp_r) = (lp.to_radians(), f.to_radians(), mp.to_radians());

    sum_l += 3958.0 * a1.sin() + 1962.0 * (lp_r - f_r).sin() + 318.0 * a2.sin();
    sum_b += -2235.0 * lp_r.sin()
        + 382.0 * a3.sin()
        + 175.0 * (a1 - f_r).sin()
        + 175.0 * (a1 + f_r).sin()
        + 127.0 * (lp_r - mp_r).sin()
        - 115.0 * (lp_r + mp_r).sin();

    (
        normalize_degrees(lp + sum_l / 1_000_000.0),
        sum_b / 1_000_000.0,
        385_000.56 + sum_r / 1000.0,
    )
}

/// Geocentric apparent place of a body: (RA deg, Dec deg, distance km).
fn geocentric_place(body: Body, t: f64, nutation: &Nutation) -> (f64, f64, f64) {
    match body {
        Body::Sun => {
            let sun = solar_coords(t);
            let (ra, dec) = ecliptic_to_equatorial(
                sun.apparent_longitude,
                0.0,
                nutation.true_obliquity(),
            );
            (ra, dec, sun.distance_au * AU_KM)
        }
        Body::Moon => {
            let (lon, lat, distance_km) = moon_ecliptic(t);
            let (ra, dec) = ecliptic_to_equatorial(
                lon + nutation.longitude,
                lat,
                nutation.true_obliquity(),
            );
            (ra, dec, distance_km)
        }
    }
}

/// Shift a geocentric place to the observer's position on the surface (Meeus 40.6/40.7).
fn topocentric(
    ra_deg: f64,
    dec_deg: f64,
    distance_km: f64,
    local_sidereal_deg: f64,
    frame: &ObserverFrame,
) -> (f64, f64) {
    let sin_parallax = (EARTH_RADIUS_M / 1000.0) / distance_km;
    let hour_angle = (local_sidereal_deg - ra_deg).to_radians();
    let dec = dec_deg.to_radians();

    let denominator = dec.cos() - frame.rho_cos_phi() * sin_parallax * hour_angle.cos();
    let d_ra = (-frame.rho_cos_phi() * sin_parallax * hour_angle.sin()).atan2(denominator);
    let topo_dec =
        ((dec.sin() - frame.rho_sin_phi() * sin_parallax) * d_ra.cos()).atan2(denominator);

    (normalize_degrees(ra_deg + d_ra.to_degrees()), topo_dec.to_degrees())
}

fn ensure_finite(what: &str, values: &[f64]) -> Result<(), VisibilityError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(VisibilityError::Ephemeris(format!(
            "non-finite value while computing {what}"
        )))
    }
}

/// Halve a bracketing interval until it is under a second wide.
fn refine_crossing<F>(
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
    lo_above: bool,
    height: F,
) -> Result<DateTime<Utc>, VisibilityError>
where
    F: Fn(DateTime<Utc>) -> Result<f64, VisibilityError>,
{
    for _ in 0..MAX_BISECTIONS {
        let span = hi - lo;
        if span.num_milliseconds() <= CONVERGENCE_MS {
            return Ok(lo + span / 2);
        }
        let mid = lo + span / 2;
        if (height(mid)? >= 0.0) == lo_above {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Err(VisibilityError::Ephemeris(
        "rise/set search did not converge".to_string(),
    ))
}

impl Ephemeris for Almanac {
    fn equatorial_to_apparent(
        &self,
        ra_hours: f64,
        dec_deg: f64,
        time: DateTime<Utc>,
        _frame: &ObserverFrame,
    ) -> Result<EquatorialCoords, VisibilityError> {
        ensure_finite("mean place", &[ra_hours, dec_deg])?;

        let t = julian_centuries(julian_day(time));
        let (ra, dec) = precess_from_j2000(ra_hours * 15.0, dec_deg, t);
        let nutation = Nutation::at(t);
        let (d_ra, d_dec) =
            apparent_offsets(ra, dec, &nutation, solar_coords(t).apparent_longitude);

        let ra_apparent = normalize_degrees(ra + d_ra);
        let dec_apparent = (dec + d_dec).clamp(-90.0, 90.0);
        ensure_finite("apparent place", &[ra_apparent, dec_apparent])?;

        Ok(EquatorialCoords {
            ra_hours: ra_apparent / 15.0,
            dec_deg: dec_apparent,
        })
    }

    fn horizontal(
        &self,
        time: DateTime<Utc>,
        frame: &ObserverFrame,
        position: EquatorialCoords,
    ) -> Result<HorizontalCoords, VisibilityError> {
        let jd = julian_day(time);
        let nutation = Nutation::at(julian_centuries(jd));
        let local_sidereal = apparent_sidereal_deg(jd, &nutation) + frame.longitude_deg();

        let hour_angle = (local_sidereal - position.ra_hours * 15.0).to_radians();
        let dec = position.dec_deg.to_radians();
        let lat = frame.latitude_deg().to_radians();

        let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
        let altitude = sin_alt.clamp(-1.0, 1.0).asin().to_degrees();
        let azimuth = (-dec.cos() * hour_angle.sin())
            .atan2(dec.sin() * lat.cos() - dec.cos() * lat.sin() * hour_angle.cos())
            .to_degrees();

        ensure_finite("horizontal position", &[altitude, azimuth])?;
        Ok(HorizontalCoords {
            altitude,
            azimuth: normalize_degrees(azimuth),
        })
    }

    fn body_position(
        &self,
        body: Body,
        time: DateTime<Utc>,
        frame: &ObserverFrame,
    ) -> Result<EquatorialCoords, VisibilityError> {
        let jd = julian_day(time);
        let t = julian_centuries(jd);
        let nutation = Nutation::at(t);

        let (ra, dec, distance_km) = geocentric_place(body, t, &nutation);
        let local_sidereal = apparent_sidereal_deg(jd, &nutation) + frame.longitude_deg();
        let (ra, dec) = topocentric(ra, dec, distance_km, local_sidereal, frame);
        ensure_finite("body position", &[ra, dec])?;

        Ok(EquatorialCoords {
            ra_hours: ra / 15.0,
            dec_deg: dec,
        })
    }

    fn rise_set(
        &self,
        body: Body,
        frame: &ObserverFrame,
        direction: RiseSetDirection,
        search_start: DateTime<Utc>,
        horizon_offset_deg: f64,
    ) -> Result<Option<DateTime<Utc>>, VisibilityError> {
        let height = |time: DateTime<Utc>| -> Result<f64, VisibilityError> {
            let position = self.body_position(body, time, frame)?;
            Ok(self.horizontal(time, frame, position)?.altitude - horizon_offset_deg)
        };

        let step = Duration::minutes(SCAN_STEP_MINUTES);
        let mut t0 = search_start;
        let mut h0 = height(t0)?;

        for _ in 0..(SCAN_SPAN_MINUTES / SCAN_STEP_MINUTES) {
            let t1 = t0 + step;
            let h1 = height(t1)?;
            let crossed = match direction {
                RiseSetDirection::Rise => h0 < 0.0 && h1 >= 0.0,
                RiseSetDirection::Set => h0 >= 0.0 && h1 < 0.0,
            };
            if crossed {
                return refine_crossing(t0, t1, h0 >= 0.0, &height).map(Some);
            }
            t0 = t1;
            h0 = h1;
        }

        Ok(None)
    }

    fn moon_illumination(&self, time: DateTime<Utc>) -> Result<MoonIllumination, VisibilityError> {
        let t = julian_centuries(julian_day(time));
        let nutation = Nutation::at(t);

        let (sun_ra, sun_dec, sun_km) = geocentric_place(Body::Sun, t, &nutation);
        let (moon_ra, moon_dec, moon_km) = geocentric_place(Body::Moon, t, &nutation);

        let (sun_ra, sun_dec) = (sun_ra.to_radians(), sun_dec.to_radians());
        let (moon_ra, moon_dec) = (moon_ra.to_radians(), moon_dec.to_radians());

        let cos_elongation = sun_dec.sin() * moon_dec.sin()
            + sun_dec.cos() * moon_dec.cos() * (sun_ra - moon_ra).cos();
        let elongation = cos_elongation.clamp(-1.0, 1.0).acos();
        let phase_angle = (sun_km * elongation.sin()).atan2(moon_km - sun_km * elongation.cos());

        let phase_angle_deg = phase_angle.to_degrees();
        let phase_fraction = (1.0 + phase_angle.cos()) / 2.0;
        ensure_finite("moon illumination", &[phase_angle_deg, phase_fraction])?;

        Ok(MoonIllumination {
            phase_angle_deg,
            phase_fraction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Julian day 2448724.5 = 1992-04-12 00:00 (Meeus examples 47.a and 48.a)
    fn meeus_1992_april_12() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1992, 4, 12, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_julian_day() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(julian_day(j2000), J2000);
        assert_eq!(julian_day(meeus_1992_april_12()), 2_448_724.5);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-10.0), 350.0);
        assert_eq!(normalize_degrees(-1e-18), 0.0);
        assert!(normalize_degrees(720.0) < 360.0);
    }

    #[test]
    fn test_mean_sidereal_time() {
        // Meeus example 12.a: 1987-04-10 0h UT → 13h10m46.3668s
        let gmst = greenwich_mean_sidereal_deg(2_446_895.5);
        assert!((gmst - 197.693_195).abs() < 1e-5, "gmst = {gmst}");
    }

    #[test]
    fn test_precession_theta_persei() {
        // Meeus example 21.b, J2000 place 2h44m12.975s +49°13′39.90″
        let t = julian_centuries(2_462_088.69);
        let (ra, dec) = precess_from_j2000(41.054_063, 49.227_750, t);
        assert!((ra - 41.547_214).abs() < 1e-4, "ra = {ra}");
        assert!((dec - 49.348_483).abs() < 1e-4, "dec = {dec}");
    }

    #[test]
    fn test_sun_position() {
        // Meeus example 25.a: 1992-10-13 0h TD
        let t = julian_centuries(2_448_908.5);
        let sun = solar_coords(t);
        assert!((sun.apparent_longitude - 199.909).abs() < 0.01);
        assert!((sun.distance_au - 0.99766).abs() < 1e-4);

        let nutation = Nutation::at(t);
        let (ra, dec, _) = geocentric_place(Body::Sun, t, &nutation);
        assert!((ra - 198.380_83).abs() < 0.01, "ra = {ra}");
        assert!((dec - -7.785_07).abs() < 0.01, "dec = {dec}");
    }

    #[test]
    fn test_moon_position() {
        // Meeus example 47.a
        let t = julian_centuries(julian_day(meeus_1992_april_12()));
        let (lon, lat, distance) = moon_ecliptic(t);
        assert!((lon - 133.162_655).abs() < 0.3, "lon = {lon}");
        assert!((lat - -3.229_126).abs() < 0.2, "lat = {lat}");
        assert!((distance - 368_409.7).abs() < 500.0, "distance = {distance}");

        let nutation = Nutation::at(t);
        let (ra, dec, _) = geocentric_place(Body::Moon, t, &nutation);
        assert!((ra - 134.688_470).abs() < 0.3, "ra = {ra}");
        assert!((dec - 13.768_368).abs() < 0.3, "dec = {dec}");
    }

    #[test]
    fn test_moon_illumination_meeus_example() {
        // Meeus example 48.a: k = 0.6786, i = 69.0756°
        let illumination = Almanac.moon_illumination(meeus_1992_april_12()).unwrap();
        assert!((illumination.phase_fraction - 0.6786).abs() < 0.01);
        assert!((illumination.phase_angle_deg - 69.0756).abs() < 1.0);
    }

    #[test]
    fn test_moon_full_and_new() {
        // Full moon 2024-01-25 17:54 UTC, new moon 2024-02-09 22:59 UTC
        let full = Utc.with_ymd_and_hms(2024, 1, 25, 17, 54, 0).unwrap();
        let new = Utc.with_ymd_and_hms(2024, 2, 9, 22, 59, 0).unwrap();

        let at_full = Almanac.moon_illumination(full).unwrap();
        assert!(at_full.phase_fraction > 0.99);
        assert!(at_full.phase_angle_deg < 12.0);

        let at_new = Almanac.moon_illumination(new).unwrap();
        assert!(at_new.phase_fraction < 0.01);
        assert!(at_new.phase_angle_deg > 168.0);
    }

    #[test]
    fn test_topocentric_moon_is_lower_than_geocentric() {
        // Parallax always pushes the Moon toward the horizon, by up to about a degree
        let time = meeus_1992_april_12();
        let frame = ObserverFrame::geodetic(45.0, 0.0, 0.0);
        let jd = julian_day(time);
        let t = julian_centuries(jd);
        let nutation = Nutation::at(t);

        let (ra, dec, _) = geocentric_place(Body::Moon, t, &nutation);
        let geocentric = Almanac
            .horizontal(time, &frame, EquatorialCoords { ra_hours: ra / 15.0, dec_deg: dec })
            .unwrap();
        let topo_place = Almanac.body_position(Body::Moon, time, &frame).unwrap();
        let topocentric = Almanac.horizontal(time, &frame, topo_place).unwrap();

        let drop = geocentric.altitude - topocentric.altitude;
        assert!(drop > 0.0 && drop < 1.05, "parallax drop = {drop}");
    }

    #[test]
    fn test_apparent_place_stays_close_to_mean_place() {
        let time = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        let frame = ObserverFrame::geodetic(0.0, 0.0, 0.0);
        // Vega
        let apparent = Almanac
            .equatorial_to_apparent(279.234_7 / 15.0, 38.783_7, time, &frame)
            .unwrap();
        // About 24 years of precession: well under half a degree
        assert!((apparent.ra_hours * 15.0 - 279.234_7).abs() < 0.5);
        assert!((apparent.dec_deg - 38.783_7).abs() < 0.5);
        assert!(apparent.ra_hours * 15.0 > 279.234_7);
    }

    #[test]
    fn test_non_finite_input_is_an_ephemeris_failure() {
        let time = meeus_1992_april_12();
        let frame = ObserverFrame::geodetic(0.0, 0.0, 0.0);
        let err = Almanac
            .equatorial_to_apparent(f64::NAN, 10.0, time, &frame)
            .unwrap_err();
        assert!(matches!(err, VisibilityError::Ephemeris(_)));
    }

    #[test]
    fn test_sunset_and_sunrise_mid_latitude() {
        // Boulder, CO, 2024-01-15: sunset ~23:53 UTC, next sunrise ~14:20 UTC
        let frame = ObserverFrame::geodetic(40.015, -105.27, 1655.0);
        let noon = Utc.with_ymd_and_hms(2024, 1, 15, 19, 0, 0).unwrap();

        let sunset = Almanac
            .rise_set(Body::Sun, &frame, RiseSetDirection::Set, noon, -1.0)
            .unwrap()
            .expect("sun sets in Boulder");
        let lo = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap();
        let hi = Utc.with_ymd_and_hms(2024, 1, 16, 0, 30, 0).unwrap();
        assert!(sunset > lo && sunset < hi, "sunset = {sunset}");

        let sunrise = Almanac
            .rise_set(Body::Sun, &frame, RiseSetDirection::Rise, sunset, -1.0)
            .unwrap()
            .expect("sun rises in Boulder");
        let lo = Utc.with_ymd_and_hms(2024, 1, 16, 13, 50, 0).unwrap();
        let hi = Utc.with_ymd_and_hms(2024, 1, 16, 14, 50, 0).unwrap();
        assert!(sunrise > lo && sunrise < hi, "sunrise = {sunrise}");

        // The refined crossing sits on the offset horizon
        let position = Almanac.body_position(Body::Sun, sunset, &frame).unwrap();
        let altitude = Almanac.horizontal(sunset, &frame, position).unwrap().altitude;
        assert!((altitude - -1.0).abs() < 0.01, "altitude at sunset = {altitude}");
    }

    #[test]
    fn test_midnight_sun_has_no_sunset() {
        let frame = ObserverFrame::geodetic(80.0, 15.0, 0.0);
        let start = Utc.with_ymd_and_hms(2024, 6, 21, 11, 0, 0).unwrap();
        let sunset = Almanac
            .rise_set(Body::Sun, &frame, RiseSetDirection::Set, start, -1.0)
            .unwrap();
        assert!(sunset.is_none());
    }
}
