use core::fmt;
use core::marker::PhantomData;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{CountedTreeMap, CountedTreeSet};

impl<K, V, C> Serialize for CountedTreeMap<K, V, C>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<T, C> Serialize for CountedTreeSet<T, C>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

struct MapVisitor<K, V> {
    marker: PhantomData<fn() -> CountedTreeMap<K, V>>,
}

impl<'de, K, V> Visitor<'de> for MapVisitor<K, V>
where
    K: Deserialize<'de> + PartialOrd,
    V: Deserialize<'de>,
{
    type Value = CountedTreeMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut map = CountedTreeMap::new();
        while let Some((k, v)) = access.next_entry()? {
            map.insert(k, v).map_err(de::Error::custom)?;
        }
        Ok(map)
    }
}

impl<'de, K, V> Deserialize<'de> for CountedTreeMap<K, V>
where
    K: Deserialize<'de> + PartialOrd,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor { marker: PhantomData })
    }
}

struct SetVisitor<T> {
    marker: PhantomData<fn() -> CountedTreeSet<T>>,
}

impl<'de, T> Visitor<'de> for SetVisitor<T>
where
    T: Deserialize<'de> + PartialOrd,
{
    type Value = CountedTreeSet<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = CountedTreeSet::new();
        while let Some(element) = access.next_element()? {
            set.insert(element).map_err(de::Error::custom)?;
        }
        Ok(set)
    }
}

impl<'de, T> Deserialize<'de> for CountedTreeSet<T>
where
    T: Deserialize<'de> + PartialOrd,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SetVisitor { marker: PhantomData })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn map_round_trip_keeps_order() {
        let map = CountedTreeMap::from([(3, String::from("c")), (1, String::from("a")), (2, String::from("b"))]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":"a","2":"b","3":"c"}"#);
        let back: CountedTreeMap<i32, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert_eq!(back.get_by_ordinal(2), Ok((&3, &String::from("c"))));
    }

    #[test]
    fn set_round_trip() {
        let set = CountedTreeSet::from([2.5, -1.0, 7.25]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[-1.0,2.5,7.25]");
        let back: CountedTreeSet<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
