/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Mapping keys may be any literal and keep their written order. Leaves are
/// converted with [`to_value`](crate::to_value), so any `Serialize`
/// expression works in leaf position; wrap multi-token expressions such as
/// `-1` or `a + b` in parentheses.
///
/// ```rust
/// use serde_yamlet::{dump, yaml, DumpOptions};
///
/// let port = 8080;
/// let value = yaml!({
///     "server": {"host": "localhost", "port": port},
///     "flags": [true, null, (-1)],
///     1: "numeric key"
/// });
/// let text = dump(&value, &DumpOptions::new()).unwrap();
/// assert_eq!(
///     text,
///     "server:\n  host: localhost\n  port: 8080\nflags:\n- true\n- null\n- -1\n1: numeric key\n"
/// );
/// ```
#[macro_export]
macro_rules! yaml {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Sequence(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Sequence(vec![$($crate::yaml!($elem)),*])
    };

    ({}) => {
        $crate::Value::Mapping($crate::Mapping::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut mapping = $crate::Mapping::new();
        $(
            mapping.insert($crate::yaml!($key), $crate::yaml!($value));
        )*
        $crate::Value::Mapping(mapping)
    }};

    ($e:expr) => {
        $crate::to_value(&$e).unwrap_or($crate::Value::Null)
    };
}
