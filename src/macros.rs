/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Objects become mappings (in the order written), arrays become sequences, and
/// every other expression becomes a scalar holding its `to_string()` text.
/// `null` becomes empty text.
///
/// ```rust
/// use rtoon::{rtoon, Value};
///
/// let doc = rtoon!({ "id": 7, "tags": ["a", "b"] });
/// assert_eq!(doc.get("id"), Some(&Value::from("7")));
/// ```
#[macro_export]
macro_rules! rtoon {
    // Handle null
    (null) => {
        $crate::Value::Scalar(::std::string::String::new())
    };

    // Handle empty array
    ([]) => {
        $crate::Value::Sequence(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Sequence(vec![$($crate::rtoon!($elem)),*])
    };

    // Handle empty object
    ({}) => {
        $crate::Value::Mapping($crate::Map::new())
    };

    // Handle non-empty object
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.insert($key.to_string(), $crate::rtoon!($value));
        )*
        $crate::Value::Mapping(object)
    }};

    // Any other expression is kept as its display text
    ($s:expr) => {
        $crate::Value::Scalar(($s).to_string())
    };
}
