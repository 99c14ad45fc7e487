use pyo3::prelude::*;

mod convert;
mod error;
mod factor;
mod geometry;
mod key;
mod lie;
mod loss_function;
mod optimizer;
mod slam;
mod utils;
mod variables;

/// Package version, from `VERSION_INFO` at build time.
///
/// Cargo pre-release suffixes are rewritten the way Python packaging spells
/// them, e.g. `0.2.0-alpha.1` becomes `0.2.0a.1`.
fn get_version() -> String {
    match option_env!("VERSION_INFO") {
        Some(version) => version.replace("-alpha", "a").replace("-beta", "b"),
        None => "dev".to_string(),
    }
}

#[pymodule]
fn _minisam(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", get_version())?;

    lie::wrap_lie_groups(m)?;

    key::wrap_core(m)?;
    variables::wrap_variables(m)?;
    factor::wrap_factor(m)?;
    loss_function::wrap_loss_function(m)?;
    geometry::wrap_geometry(m)?;
    optimizer::wrap_optimizer(m)?;
    slam::wrap_slam(m)?;
    utils::wrap_utils(m)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyo3::ffi::c_str;
    use pyo3::types::PyDict;
    use std::ffi::CStr;

    /// Run `code` with the freshly built module bound to `m`.
    fn run_with_module(code: &CStr) {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let m = PyModule::new(py, "_minisam").unwrap();
            _minisam(&m).unwrap();
            let globals = PyDict::new(py);
            globals.set_item("m", &m).unwrap();
            if let Err(err) = py.run(code, Some(&globals), None) {
                err.print(py);
                panic!("python code failed: {err}");
            }
        });
    }

    #[test]
    fn test_version_is_not_empty() {
        let version = get_version();
        assert!(!version.is_empty());
        if option_env!("VERSION_INFO").is_none() {
            assert_eq!(version, "dev");
        }
    }

    #[test]
    fn test_module_attributes() {
        run_with_module(c_str!(
            r#"
assert isinstance(m.__version__, str) and m.__version__
for name in ["SO2", "SE2", "SO3", "SE3", "Variables", "LossFunction", "CalibK", "loadG2O"]:
    assert hasattr(m, name), name
assert type(m.SO2()).__module__ == "_minisam"
"#
        ));
    }

    #[test]
    fn test_so2_constructors() {
        run_with_module(c_str!(
            r#"
from math import isclose, pi
assert m.SO2().theta() == 0.0
assert isclose(m.SO2(0.3).theta(), 0.3)
assert isclose(m.SO2(1).theta(), 1.0)
assert isclose(m.SO2([0.0, 2.0]).theta(), pi / 2)
assert isclose(m.SO2([[0.0, -1.0], [1.0, 0.0]]).theta(), pi / 2)

c = m.SO2(1 + 1j).unit_complex()
assert isinstance(c, complex)
assert isclose(c.real, 2 ** -0.5) and isclose(c.imag, 2 ** -0.5)

try:
    m.SO2(0j)
    raise AssertionError("zero complex accepted")
except ValueError:
    pass
"#
        ));
    }

    #[test]
    fn test_so3_quaternion_order() {
        run_with_module(c_str!(
            r#"
from math import isclose
s = m.SO3(0.0, 0.0, 0.7071067811865476, 0.7071067811865476)
q = [float(v) for v in s.unit_quaternion()]
expected = [0.0, 0.0, 0.7071067811865476, 0.7071067811865476]
assert all(isclose(a, b, abs_tol=1e-12) for a, b in zip(q, expected)), q

p = s * [1.0, 0.0, 0.0]
assert abs(p[0]) < 1e-12 and isclose(p[1], 1.0) and abs(p[2]) < 1e-12

assert repr(m.SO3()) == "SO3(quaternion: [0, 0, 0, 1])"
assert isclose(m.SO3(s.matrix()).unit_quaternion()[3], 0.7071067811865476)

try:
    m.SO3(0.0, 0.0, 0.0, 0.0)
    raise AssertionError("zero quaternion accepted")
except ValueError:
    pass
try:
    m.SO3(1.0, 2.0)
    raise AssertionError("two arguments accepted")
except TypeError:
    pass
"#
        ));
    }

    #[test]
    fn test_inverse_and_product() {
        run_with_module(c_str!(
            r#"
import numpy as np
samples = [
    m.SO2(0.4),
    m.SE2.rot(0.5) * m.SE2.transX(1.0),
    m.SO3.rotZ(0.2) * m.SO3.rotX(-0.7),
    m.SE3.transX(1.0) * m.SE3.rotY(0.3),
]
for g in samples:
    assert np.allclose((g.inverse() * g).log(), 0.0, atol=1e-12)
    assert np.allclose((g * g.inverse()).matrix(), np.eye(g.matrix().shape[0]), atol=1e-12)
    assert repr(g) == repr(g) == str(g)
    assert np.allclose(type(g).exp(g.log()).matrix(), g.matrix(), atol=1e-12)

t = (m.SE2.rot(0.5) * m.SE2.transX(1.0)).translation()
assert np.allclose(t, [np.cos(0.5), np.sin(0.5)])
assert repr(m.SE2()) == "SE2(theta: 0, translation: [0, 0])"

try:
    m.SO2(0.3) * "x"
    raise AssertionError("string operand accepted")
except TypeError:
    pass
"#
        ));
    }

    #[test]
    fn test_in_place_product_keeps_identity() {
        run_with_module(c_str!(
            r#"
from math import isclose
a = m.SO2(0.3)
alias = a
a *= m.SO2(0.2)
assert a is alias and isclose(a.theta(), 0.5)
a *= a
assert a is alias and isclose(a.theta(), 1.0)

s = m.SE3.transX(1.0)
s *= m.SE3.transY(2.0)
assert list(s.translation()) == [1.0, 2.0, 0.0]
"#
        ));
    }

    #[test]
    fn test_output_only_conversions() {
        run_with_module(c_str!(
            r#"
assert len(m.SO3().params()) == 4
p = m.SE3.transX(1.0).params()
assert len(p) == 7 and float(p[3]) == 1.0 and float(p[4]) == 1.0
assert m.SE3().Adj().shape == (6, 6)
"#
        ));
    }

    #[test]
    fn test_variables_errors() {
        run_with_module(c_str!(
            r#"
v = m.Variables()
k = m.key("x", 1)
assert m.key_string(k) == "x1"
v.add(k, m.SE2.transX(2.0))
assert len(v) == 1 and k in v
assert isinstance(v.at(k), m.SE2)
try:
    v.at(m.key("x", 2))
    raise AssertionError("missing key found")
except KeyError:
    pass
try:
    v.update(k, m.SO3())
    raise AssertionError("type change accepted")
except ValueError:
    pass
"#
        ));
    }
}
