use quickcheck::{Arbitrary, Gen};

/// A generated JSON document for property tests.
///
/// Wraps `serde_json::Value` so the oracle crate's serializer produces the
/// input text; numbers stay within the ranges every parse path agrees on
/// (finite doubles and 64-bit integers).
#[derive(Debug, Clone)]
pub(crate) struct ArbJson(pub serde_json::Value);

impl Arbitrary for ArbJson {
    fn arbitrary(g: &mut Gen) -> Self {
        fn gen_val(g: &mut Gen, depth: usize) -> serde_json::Value {
            let scalar = depth == 0;
            match usize::arbitrary(g) % if scalar { 5 } else { 7 } {
                0 => serde_json::Value::Null,
                1 => serde_json::Value::Bool(bool::arbitrary(g)),
                2 => serde_json::Value::from(i64::arbitrary(g)),
                3 => {
                    let mut v = f64::arbitrary(g);
                    while !v.is_finite() {
                        v = f64::arbitrary(g);
                    }
                    serde_json::Value::from(v)
                }
                4 => serde_json::Value::from(String::arbitrary(g)),
                5 => {
                    let len = usize::arbitrary(g) % 4;
                    serde_json::Value::Array(
                        (0..len).map(|_| gen_val(g, depth - 1)).collect(),
                    )
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    let mut map = serde_json::Map::new();
                    for _ in 0..len {
                        map.insert(String::arbitrary(g), gen_val(g, depth - 1));
                    }
                    serde_json::Value::Object(map)
                }
            }
        }

        let depth = usize::arbitrary(g) % 4;
        ArbJson(gen_val(g, depth))
    }
}
