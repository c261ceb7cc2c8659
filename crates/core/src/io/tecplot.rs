//! Tecplot point-format export of primitive variables
//!
//! Writes one line per interior cell with position, density, velocity,
//! pressure, temperature and vorticity magnitude:
//!
//! ```text
//! p = (γ - 1)(E - ½ρ|u|²)
//! T = p / (R ρ)
//! ω = ½ (∂w/∂y - ∂v/∂z, ∂u/∂z - ∂w/∂x, ∂v/∂x - ∂u/∂y)
//! ```
//!
//! Derivatives are second-order central differences, so ghost cells must be
//! populated. Values are printed with six significant digits in the style of
//! C's `%g`. The eddy viscosity is not part of this output.

use super::{FlowSnapshot, GasProperties};
use crate::error::SgsError;
use crate::field::FieldPool;
use crate::grid::{Axis, GridSpacing};
use crate::sgs::{primitive_velocity, velocity_gradient};
use nalgebra::Vector3;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `snapshot` in Tecplot ASCII point format to `out`
///
/// # Errors
///
/// Returns [`SgsError::ShapeMismatch`] if the energy field does not match the
/// conservative fields, or [`SgsError::Io`] if writing fails.
pub fn write_tecplot<W: Write>(
    out: &mut W,
    snapshot: &FlowSnapshot<'_>,
    spacing: &GridSpacing,
    gas: &GasProperties,
) -> Result<(), SgsError> {
    let dims = snapshot.state.density.dims();
    snapshot.state.expect_dims(dims)?;
    snapshot.energy.expect_dims(dims, "energy")?;

    let mut pool = FieldPool::new(dims);
    let velocity = primitive_velocity(&snapshot.state, &mut pool);
    let inv_2h = spacing.inverse_double_spacing();

    writeln!(out, "title     = \" 3-D compressible case \"")?;
    writeln!(out, "variables = \" x \"")?;
    for name in ["y", "z", "rho", "u", "v", "w", "p", "T", "Vort. mag."] {
        writeln!(out, "\"{name}\"")?;
    }
    writeln!(out, "zone t=\" \"")?;
    writeln!(out, "i={}, j={}, k={}, f=point", dims.lx, dims.ly, dims.lz)?;

    let rho = snapshot.state.density;
    for k in 1..=dims.lz {
        for j in 1..=dims.ly {
            for i in 1..=dims.lx {
                let idx = dims.index(i, j, k);
                let x = spacing.cell_center(Axis::X, i);
                let y = spacing.cell_center(Axis::Y, j);
                let z = spacing.cell_center(Axis::Z, k);

                let r = rho[idx];
                let vel = Vector3::new(velocity[0][idx], velocity[1][idx], velocity[2][idx]);
                let p = gas.pressure(r, &vel, snapshot.energy[idx]);
                let t = gas.temperature(r, p);

                let g = velocity_gradient(&velocity, dims, inv_2h, idx);
                let omega = 0.5
                    * Vector3::new(
                        g[(2, 1)] - g[(1, 2)],
                        g[(0, 2)] - g[(2, 0)],
                        g[(1, 0)] - g[(0, 1)],
                    );

                let row = [x, y, z, r, vel.x, vel.y, vel.z, p, t, omega.norm()];
                for (n, value) in row.into_iter().enumerate() {
                    let sep = if n == 0 { "" } else { " " };
                    write!(out, "{sep}{}", GeneralFloat(value))?;
                }
                writeln!(out)?;
            }
        }
    }

    Ok(())
}

/// Shortest of fixed or exponent notation at six significant digits,
/// trailing zeros removed (C's `%g`)
struct GeneralFloat(f64);

const SIGNIFICANT_DIGITS: i32 = 6;

impl fmt::Display for GeneralFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if !value.is_finite() {
            return f.write_str(&value.to_string().to_lowercase());
        }
        if value == 0.0 {
            return f.write_str(if value.is_sign_negative() { "-0" } else { "0" });
        }

        // Exponent after rounding to six digits, e.g. 9.999996 -> 1.00000e1
        let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
        let (mantissa, exponent) = scientific.split_once('e').ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

        if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
            let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
            let fixed = format!("{value:.decimals$}");
            f.write_str(trim_fraction(&fixed))
        } else {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
        }
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Write `snapshot` to `<dir>/<step>.plt`, returning the path written
///
/// # Errors
///
/// Returns [`SgsError::Io`] if the file cannot be created or written, or
/// [`SgsError::ShapeMismatch`] for inconsistent fields.
pub fn write_tecplot_file(
    dir: &Path,
    step: u64,
    snapshot: &FlowSnapshot<'_>,
    spacing: &GridSpacing,
    gas: &GasProperties,
) -> Result<PathBuf, SgsError> {
    let path = dir.join(format!("{step}.plt"));
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    write_tecplot(&mut writer, snapshot, spacing, gas)?;
    writer.flush()?;
    info!("Wrote Tecplot snapshot {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ScalarField;
    use crate::grid::GridDimensions;
    use crate::sgs::ConservativeState;
    use approx::assert_relative_eq;

    fn render(snapshot: &FlowSnapshot<'_>, spacing: &GridSpacing) -> String {
        let mut buf = Vec::new();
        write_tecplot(&mut buf, snapshot, spacing, &GasProperties::default()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_and_line_count() {
        let dims = GridDimensions::new(2, 3, 2);
        let rho = ScalarField::with_value(dims, 1.0);
        let zero = ScalarField::new(dims);
        let energy = ScalarField::with_value(dims, 2.5);
        let snapshot = FlowSnapshot {
            state: ConservativeState::new(&rho, &zero, &zero, &zero),
            energy: &energy,
        };

        let text = render(&snapshot, &GridSpacing::uniform(1.0));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "title     = \" 3-D compressible case \"");
        assert_eq!(lines[1], "variables = \" x \"");
        assert_eq!(lines[10], "\"Vort. mag.\"");
        assert_eq!(lines[12], "i=2, j=3, k=2, f=point");
        assert_eq!(lines.len(), 13 + 12);

        // First data row is interior cell (1, 1, 1): p = 0.4 * 2.5 = 1
        let values: Vec<f64> = lines[13]
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(&values[..3], &[0.5, 0.5, 0.5]);
        assert_relative_eq!(values[7], 1.0, epsilon = 1e-12);
        assert_relative_eq!(values[8], 1.0 / 287.0, max_relative = 1e-5);
        assert_eq!(lines[13].split_whitespace().nth(8), Some("0.00348432"));
        assert_eq!(values[9], 0.0);
    }

    #[test]
    fn test_rigid_rotation_vorticity() {
        // u = -Ωy, v = Ωx has vorticity Ω ẑ, reported as ½ of the curl
        let dims = GridDimensions::new(3, 3, 3);
        let spacing = GridSpacing::uniform(0.5);
        let rate = 2.0;
        let rho = ScalarField::with_value(dims, 1.0);
        let ru = ScalarField::from_fn(dims, |_, j, _| -rate * spacing.cell_center(Axis::Y, j));
        let rv = ScalarField::from_fn(dims, |i, _, _| rate * spacing.cell_center(Axis::X, i));
        let rw = ScalarField::new(dims);
        let energy = ScalarField::with_value(dims, 10.0);
        let snapshot = FlowSnapshot {
            state: ConservativeState::new(&rho, &ru, &rv, &rw),
            energy: &energy,
        };

        let text = render(&snapshot, &spacing);
        for line in text.lines().skip(13) {
            let vort: f64 = line.split_whitespace().last().unwrap().parse().unwrap();
            assert_relative_eq!(vort, rate, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_general_float_formatting() {
        let cases = [
            (0.1 + 0.2, "0.3"),
            (1e-5, "1e-05"),
            (123456789.0, "1.23457e+08"),
            (0.0001234, "0.0001234"),
            (100.0, "100"),
            (-2.5, "-2.5"),
            (1234567.0, "1.23457e+06"),
            (123456.0, "123456"),
            (0.0, "0"),
            (9.999996, "10"),
            (f64::INFINITY, "inf"),
        ];
        for (value, expected) in cases {
            assert_eq!(GeneralFloat(value).to_string(), expected, "formatting {value}");
        }
    }

    #[test]
    fn test_energy_shape_checked() {
        let dims = GridDimensions::new(2, 2, 2);
        let rho = ScalarField::with_value(dims, 1.0);
        let energy = ScalarField::new(GridDimensions::new(2, 2, 3));
        let snapshot = FlowSnapshot {
            state: ConservativeState::new(&rho, &rho, &rho, &rho),
            energy: &energy,
        };
        let mut buf = Vec::new();
        let err = write_tecplot(&mut buf, &snapshot, &GridSpacing::default(), &GasProperties::default())
            .unwrap_err();
        assert!(matches!(err, SgsError::ShapeMismatch { field: "energy", .. }));
    }
}
