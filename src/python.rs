use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::DEFAULT_TRACE_LENGTH;
use crate::core::{Body, BodyId, Environment, Particle, RigidPair, Vec2};
use crate::diagnostics;
use crate::scene::{parse_scene, write_scene};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn rows_to_array(rows: &[Vec2]) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((rows.len(), 2));
    for (i, v) in rows.iter().enumerate() {
        arr[[i, 0]] = v.x;
        arr[[i, 1]] = v.y;
    }
    arr
}

fn histogram_dict(py: Python<'_>, (edges, counts): diagnostics::Histogram) -> PyResult<Py<PyDict>> {
    let out = PyDict::new(py);
    out.set_item("edges", edges.into_pyarray(py))?;
    out.set_item("counts", counts.into_pyarray(py))?;
    Ok(out.into())
}

/// Python-facing wrapper around the Rust `Environment`.
///
/// - __new__(vertices, sort_vertices=False, stack_size=100)
/// - add_ball / add_dumbbell
/// - step(dt, gravity=0.0) / run(steps, dt, gravity=0.0)
/// - get_positions() -> np.ndarray, shape (N, 2)
/// - get_velocities() -> np.ndarray, shape (N, 2)
/// - get_pressures() -> np.ndarray, shape (W,)
#[pyclass]
pub struct Billiard {
    env: Environment,
}

#[pymethods]
impl Billiard {
    /// Build a closed polygon of walls from an (M, 2) array of vertices.
    ///
    /// Errors: raises ValueError on invalid geometry.
    #[new]
    #[pyo3(signature = (vertices, sort_vertices=false, stack_size=100))]
    fn new(
        vertices: PyReadonlyArray2<'_, f64>,
        sort_vertices: bool,
        stack_size: usize,
    ) -> PyResult<Self> {
        let arr = vertices.as_array();
        if arr.ndim() != 2 || arr.shape()[1] != 2 {
            return Err(py_err(format!(
                "vertices must have shape (M, 2), got {:?}",
                arr.shape()
            )));
        }
        let pts: Vec<Vec2> = (0..arr.shape()[0])
            .map(|i| Vec2::new(arr[[i, 0]], arr[[i, 1]]))
            .collect();
        let env = Environment::from_polygon(&pts, sort_vertices, stack_size, Vec::new())
            .map_err(py_err)?;
        Ok(Self { env })
    }

    /// Build from scene text (see `save_scene`).
    #[staticmethod]
    #[pyo3(signature = (text, trace_length=DEFAULT_TRACE_LENGTH))]
    fn from_scene(text: &str, trace_length: usize) -> PyResult<Self> {
        let env = parse_scene(text, trace_length)
            .and_then(|scene| scene.into_environment())
            .map_err(py_err)?;
        Ok(Self { env })
    }

    /// Replace all walls and bodies with the scene text.
    #[pyo3(signature = (text, trace_length=DEFAULT_TRACE_LENGTH))]
    fn load_scene(&mut self, text: &str, trace_length: usize) -> PyResult<()> {
        let scene = parse_scene(text, trace_length).map_err(py_err)?;
        scene.load_into(&mut self.env).map_err(py_err)
    }

    fn save_scene(&self) -> String {
        write_scene(&self.env)
    }

    /// Add a disc; returns its body id.
    #[pyo3(signature = (m, r, x, y, v_x=0.0, v_y=0.0, teflon=true, trace=false))]
    #[allow(clippy::too_many_arguments)]
    fn add_ball(
        &mut self,
        m: f64,
        r: f64,
        x: f64,
        y: f64,
        v_x: f64,
        v_y: f64,
        teflon: bool,
        trace: bool,
    ) -> PyResult<u32> {
        let mut ball = Particle::new(m, r, Vec2::new(x, y), Vec2::new(v_x, v_y))
            .map_err(py_err)?
            .with_teflon(teflon);
        if trace {
            ball = ball.with_trail(DEFAULT_TRACE_LENGTH);
        }
        self.env.push_body(ball).map(|id| id.0).map_err(py_err)
    }

    /// Add a rigid pair from two `(m, r, x, y, v_x, v_y)` tuples; returns its body id.
    fn add_dumbbell(
        &mut self,
        a: (f64, f64, f64, f64, f64, f64),
        b: (f64, f64, f64, f64, f64, f64),
    ) -> PyResult<u32> {
        let make = |(m, r, x, y, vx, vy): (f64, f64, f64, f64, f64, f64)| {
            Particle::new(m, r, Vec2::new(x, y), Vec2::new(vx, vy))
        };
        let pair =
            RigidPair::new(make(a).map_err(py_err)?, make(b).map_err(py_err)?).map_err(py_err)?;
        self.env.push_body(pair).map(|id| id.0).map_err(py_err)
    }

    /// Advance one frame (releases the GIL during computation).
    #[pyo3(signature = (dt, gravity=0.0))]
    fn step(&mut self, py: Python<'_>, dt: f64, gravity: f64) -> PyResult<()> {
        py.detach(|| self.env.step(dt, gravity)).map_err(py_err)
    }

    /// Advance `steps` frames (releases the GIL during computation).
    #[pyo3(signature = (steps, dt, gravity=0.0))]
    fn run(&mut self, py: Python<'_>, steps: usize, dt: f64, gravity: f64) -> PyResult<()> {
        py.detach(|| self.env.run(steps, dt, gravity)).map_err(py_err)
    }

    fn reverse_velocities(&mut self) {
        self.env.reverse_velocities();
    }

    fn frame(&self) -> u64 {
        self.env.frame()
    }

    fn time(&self) -> f64 {
        self.env.time()
    }

    /// Return moving-body positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let pyarr = rows_to_array(&self.env.positions()).into_pyarray(py);
        Ok(pyarr.to_owned().into())
    }

    /// Return moving-body velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let pyarr = rows_to_array(&self.env.velocities()).into_pyarray(py);
        Ok(pyarr.to_owned().into())
    }

    /// Mean pressure per wall, in wall order.
    fn get_pressures<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        Ok(self.env.pressures().into_pyarray(py).to_owned().into())
    }

    /// Return `{"mass", "p_x", "p_y", "w_x", "w_y", "w_r", "w"}` for one moving body.
    ///
    /// Errors: raises ValueError for unknown ids or walls.
    fn get_body<'py>(&self, py: Python<'py>, id: u32) -> PyResult<Py<PyDict>> {
        let body: &Body = self
            .env
            .body(BodyId(id))
            .ok_or_else(|| py_err(format!("no body with id {id}")))?;
        let not_moving = || py_err(format!("body {id} is a wall"));
        let mass = body.mass().ok_or_else(not_moving)?;
        let p = body.momentum().ok_or_else(not_moving)?;
        let (w_x, w_y) = body.axis_energies().ok_or_else(not_moving)?;
        let w_r = body.rotational_energy().ok_or_else(not_moving)?;
        let out = PyDict::new(py);
        out.set_item("mass", mass)?;
        out.set_item("p_x", p.x)?;
        out.set_item("p_y", p.y)?;
        out.set_item("w_x", w_x)?;
        out.set_item("w_y", w_y)?;
        out.set_item("w_r", w_r)?;
        out.set_item("w", w_x + w_y + w_r)?;
        Ok(out.into())
    }

    /// Total kinetic + rotational energy.
    fn get_energy(&self) -> f64 {
        self.env.kinetic_energy()
    }

    fn get_momentum(&self) -> (f64, f64) {
        let p = self.env.total_momentum();
        (p.x, p.y)
    }

    /// Cumulative seconds spent integrating, in the broad phase, and resolving.
    fn get_timings(&self) -> (f64, f64, f64) {
        let t = self.env.timings();
        (
            t.integrate.as_secs_f64(),
            t.broad_phase.as_secs_f64(),
            t.resolve.as_secs_f64(),
        )
    }

    /// Histogram of per-body energy: {"edges": np.ndarray, "counts": np.ndarray}.
    ///
    /// Errors: raises ValueError if any energy is NaN/inf.
    #[pyo3(signature = (bins=40, range=None))]
    fn get_energy_histogram<'py>(
        &self,
        py: Python<'py>,
        bins: usize,
        range: Option<(f64, f64)>,
    ) -> PyResult<Py<PyDict>> {
        let hist = diagnostics::energy_histogram(&self.env, bins, range).map_err(py_err)?;
        histogram_dict(py, hist)
    }

    /// Histogram of one velocity component over moving bodies (`axis` 0 = x, 1 = y).
    ///
    /// Errors: raises ValueError for a bad axis or NaN/inf velocities.
    #[pyo3(signature = (axis=0, bins=80, range=None))]
    fn get_velocity_histogram<'py>(
        &self,
        py: Python<'py>,
        axis: usize,
        bins: usize,
        range: Option<(f64, f64)>,
    ) -> PyResult<Py<PyDict>> {
        let hist =
            diagnostics::velocity_histogram(&self.env, axis, bins, range).map_err(py_err)?;
        histogram_dict(py, hist)
    }
}

/// The billiard Python module entry point.
#[pymodule]
fn billiard(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Billiard>()?;
    Ok(())
}
