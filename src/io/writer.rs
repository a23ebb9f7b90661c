//! Plain-text output consumed by the external WHAM tools.
//!
//! Layouts follow C `printf` conventions, including the two-digit signed
//! exponent of `%e`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;
use nalgebra::DMatrix;

use crate::analysis::Discretizer;
use crate::dynamics::Sample;
use crate::error::Result;
use crate::protocol::{TemperingOutput, UmbrellaOutput};
use crate::sampling::{TemperatureLadder, Trajectory, UmbrellaSample};

/// `%.{precision}e`, or `%+.{precision}e` with `force_sign`.
pub fn format_exp(value: f64, precision: usize, force_sign: bool) -> String {
    let s = if force_sign {
        format!("{:+.*e}", precision, value)
    } else {
        format!("{:.*e}", precision, value)
    };
    match s.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

/// `%6d %6d %+.6e` per sample: bin, ladder state, E / kT_state.
pub fn write_tempering_trajectory<W: Write>(
    w: &mut W,
    trajectory: &Trajectory<Sample>,
    discretizer: &Discretizer,
    ladder: &TemperatureLadder,
) -> io::Result<()> {
    for s in trajectory {
        writeln!(
            w,
            "{:6} {:6} {}",
            discretizer.bin(s.position),
            s.state_index,
            format_exp(s.reduced_energy(ladder.kt(s.state_index)), 6, true)
        )?;
    }
    Ok(())
}

/// `%6d %6d ` then `%+.6e ` per restraint bias divided by kT.
pub fn write_umbrella_trajectory<W: Write>(
    w: &mut W,
    window: &Trajectory<UmbrellaSample>,
    discretizer: &Discretizer,
    kt: f64,
) -> io::Result<()> {
    for s in window {
        write!(w, "{:6} {:6} ", discretizer.bin(s.sample.position), s.sample.state_index)?;
        for b in &s.bias {
            write!(w, "{} ", format_exp(b / kt, 6, true))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// One line per row, each entry as ` %+.{precision}e`.
pub fn write_bias_matrix<W: Write>(w: &mut W, matrix: &DMatrix<f64>, precision: usize) -> io::Result<()> {
    for row in matrix.row_iter() {
        for value in row.iter() {
            write!(w, " {}", format_exp(*value, precision, true))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// `%4f %+.6e` per (center, weight) pair.
pub fn write_reference<W: Write>(w: &mut W, reference: &[(f64, f64)]) -> io::Result<()> {
    for (center, p) in reference {
        writeln!(w, "{:4.6} {}", center, format_exp(*p, 6, true))?;
    }
    Ok(())
}

/// One `%.18e` per line.
pub fn write_kts<W: Write>(w: &mut W, kts: &[f64]) -> io::Result<()> {
    for kt in kts {
        writeln!(w, "{}", format_exp(*kt, 18, false))?;
    }
    Ok(())
}

fn create<P: AsRef<Path>>(path: P) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// `Traj.dat`, `kT.dat`, `b_K_i.dat` and `exact.dat` under `dir`.
pub fn write_tempering_outputs(dir: &Path, output: &TemperingOutput) -> Result<()> {
    fs::create_dir_all(dir)?;

    let mut w = create(dir.join("Traj.dat"))?;
    write_tempering_trajectory(&mut w, &output.trajectory, &output.discretizer, &output.ladder)?;
    w.flush()?;

    let mut w = create(dir.join("kT.dat"))?;
    write_kts(&mut w, output.ladder.kts())?;
    w.flush()?;

    let mut w = create(dir.join("b_K_i.dat"))?;
    write_bias_matrix(&mut w, &output.bias_matrix, 6)?;
    w.flush()?;

    let mut w = create(dir.join("exact.dat"))?;
    write_reference(&mut w, &output.reference)?;
    w.flush()?;

    info!("wrote simulated tempering output to {}", dir.display());
    Ok(())
}

/// `exact.dat`, one `Traj<i>.dat` per window and `b_K_i.dat` under `dir`.
pub fn write_umbrella_outputs(dir: &Path, output: &UmbrellaOutput) -> Result<()> {
    fs::create_dir_all(dir)?;

    let mut w = create(dir.join("exact.dat"))?;
    write_reference(&mut w, &output.reference)?;
    w.flush()?;

    for (i, window) in output.windows.iter().enumerate() {
        let mut w = create(dir.join(format!("Traj{i}.dat")))?;
        write_umbrella_trajectory(&mut w, window, &output.discretizer, output.kt)?;
        w.flush()?;
    }

    let mut w = create(dir.join("b_K_i.dat"))?;
    write_bias_matrix(&mut w, &output.bias_matrix, 8)?;
    w.flush()?;

    info!(
        "wrote {} umbrella windows to {}",
        output.windows.len(),
        dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_exp_matches_printf() {
        assert_eq!(format_exp(1.5, 6, true), "+1.500000e+00");
        assert_eq!(format_exp(-0.000123, 6, true), "-1.230000e-04");
        assert_eq!(format_exp(6.02e23, 8, true), "+6.02000000e+23");
        assert_eq!(format_exp(1e-120, 2, true), "+1.00e-120");
        assert_eq!(format_exp(0.0, 6, true), "+0.000000e+00");
        assert_eq!(format_exp(2.0, 18, false), "2.000000000000000000e+00");
    }

    #[test]
    fn test_reference_layout() {
        let mut buf = Vec::new();
        write_reference(&mut buf, &[(-0.7, 1.0), (4.5, 0.25)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "-0.700000 +1.000000e+00\n4.500000 +2.500000e-01\n");
    }

    #[test]
    fn test_bias_matrix_layout() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 2.5, 1e-3]);
        let mut buf = Vec::new();
        write_bias_matrix(&mut buf, &m, 6).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            " +0.000000e+00 -1.000000e+00\n +2.500000e+00 +1.000000e-03\n"
        );
    }

    #[test]
    fn test_tempering_trajectory_layout() {
        let ladder = TemperatureLadder::new(vec![2.0, 4.0]).unwrap();
        let discretizer = Discretizer::new(vec![0.0, 1.0, 2.0]).unwrap();
        let mut traj = Trajectory::new();
        traj.push(Sample { position: 0.5, state_index: 1, energy: -2.0 });
        traj.push(Sample { position: 7.0, state_index: 0, energy: 3.0 });
        let mut buf = Vec::new();
        write_tempering_trajectory(&mut buf, &traj, &discretizer, &ladder).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "     1      1 -5.000000e-01\n     3      0 +1.500000e+00\n"
        );
    }

    #[test]
    fn test_umbrella_trajectory_layout() {
        let discretizer = Discretizer::new(vec![0.0, 1.0]).unwrap();
        let mut window = Trajectory::new();
        window.push(UmbrellaSample {
            sample: Sample { position: 0.5, state_index: 2, energy: 0.0 },
            bias: vec![0.0, 4.0],
        });
        let mut buf = Vec::new();
        write_umbrella_trajectory(&mut buf, &window, &discretizer, 2.0).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "     1      2 +0.000000e+00 +2.000000e+00 \n"
        );
    }

    #[test]
    fn test_kts_layout() {
        let mut buf = Vec::new();
        write_kts(&mut buf, &[2.0, 15.0]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "2.000000000000000000e+00\n1.500000000000000000e+01\n"
        );
    }
}
