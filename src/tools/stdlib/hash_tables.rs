//! Map tools
//!
//! `assoc` and `dissoc` return new maps. `assoc!` and `dissoc!` change a map in
//! place and refuse immutable maps (every map literal is immutable; `hash-map`
//! builds mutable ones).

use crate::error::{Error, Result};
use crate::runtime::{Expr, Map};
use crate::tools::{expect_at_least, Tool, ToolRegistry};

/// Register all map tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(HashMapTool);
    registry.register(GetTool);
    registry.register(ContainspTool);
    registry.register(KeysTool);
    registry.register(ValsTool);
    registry.register(AssocTool);
    registry.register(DissocTool);
    registry.register(AssocBangTool);
    registry.register(DissocBangTool);
}

fn as_map<'a>(tool: &str, expr: &'a Expr) -> Result<&'a Map> {
    match expr {
        Expr::Map(map) => Ok(map),
        other => Err(Error::type_error(
            format!("map for {}", tool),
            other.type_name(),
        )),
    }
}

/// Pairs up `k1 v1 k2 v2 ...`
fn pairs(tool: &str, args: &[Expr]) -> Result<Vec<(Expr, Expr)>> {
    if args.len() % 2 != 0 {
        return Err(Error::invalid_args(
            tool,
            "expected an even number of key/value arguments",
        ));
    }
    Ok(args
        .chunks(2)
        .map(|kv| (kv[0].clone(), kv[1].clone()))
        .collect())
}

/// hash-map - Build a mutable map from key/value arguments
pub struct HashMapTool;

impl Tool for HashMapTool {
    fn name(&self) -> &str {
        "hash-map"
    }

    fn description(&self) -> &str {
        "Build a mutable map from key/value arguments"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        Ok(Expr::Map(Map::from_pairs(pairs(self.name(), args)?, true)))
    }
}

/// get - Value for a key, nil (or a default) when absent
pub struct GetTool;

impl Tool for GetTool {
    fn name(&self) -> &str {
        "get"
    }

    fn description(&self) -> &str {
        "Value for a key, or nil / the default when absent"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        if args.len() != 2 && args.len() != 3 {
            return Err(Error::invalid_args(
                self.name(),
                format!("expected 2 or 3 arguments, got {}", args.len()),
            ));
        }
        let default = args.get(2).cloned().unwrap_or(Expr::Nil);
        match &args[0] {
            Expr::Nil => Ok(default),
            other => Ok(as_map(self.name(), other)?.get(&args[1]).unwrap_or(default)),
        }
    }
}

/// contains? - True if the map has the key
pub struct ContainspTool;

impl Tool for ContainspTool {
    fn name(&self) -> &str {
        "contains?"
    }

    fn description(&self) -> &str {
        "True if the map has the key"
    }

    fn arity(&self) -> Option<usize> {
        Some(2)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        let map = as_map(self.name(), &args[0])?;
        Ok(Expr::from(map.contains_key(&args[1])))
    }
}

/// keys - Keys of a map as a list
pub struct KeysTool;

impl Tool for KeysTool {
    fn name(&self) -> &str {
        "keys"
    }

    fn description(&self) -> &str {
        "Keys of a map, as a list"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        Ok(Expr::seq(as_map(self.name(), &args[0])?.keys()))
    }
}

/// vals - Values of a map as a list
pub struct ValsTool;

impl Tool for ValsTool {
    fn name(&self) -> &str {
        "vals"
    }

    fn description(&self) -> &str {
        "Values of a map, as a list"
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        self.check_arity(args)?;
        Ok(Expr::seq(as_map(self.name(), &args[0])?.values()))
    }
}

/// assoc - New map with extra key/value pairs
pub struct AssocTool;

impl Tool for AssocTool {
    fn name(&self) -> &str {
        "assoc"
    }

    fn description(&self) -> &str {
        "New map with the given key/value pairs added"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        expect_at_least(self.name(), args, 1)?;
        let map = as_map(self.name(), &args[0])?;
        Ok(Expr::Map(map.assoc(pairs(self.name(), &args[1..])?)))
    }
}

/// dissoc - New map without the given keys
pub struct DissocTool;

impl Tool for DissocTool {
    fn name(&self) -> &str {
        "dissoc"
    }

    fn description(&self) -> &str {
        "New map without the given keys"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        expect_at_least(self.name(), args, 1)?;
        let map = as_map(self.name(), &args[0])?;
        Ok(Expr::Map(map.dissoc(&args[1..])))
    }
}

/// assoc! - Add key/value pairs to a mutable map in place
pub struct AssocBangTool;

impl Tool for AssocBangTool {
    fn name(&self) -> &str {
        "assoc!"
    }

    fn description(&self) -> &str {
        "Add key/value pairs to a mutable map in place"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        expect_at_least(self.name(), args, 1)?;
        let map = as_map(self.name(), &args[0])?;
        map.assoc_in_place(pairs(self.name(), &args[1..])?)?;
        Ok(args[0].clone())
    }
}

/// dissoc! - Remove keys from a mutable map in place
pub struct DissocBangTool;

impl Tool for DissocBangTool {
    fn name(&self) -> &str {
        "dissoc!"
    }

    fn description(&self) -> &str {
        "Remove keys from a mutable map in place"
    }

    fn execute(&self, args: &[Expr]) -> Result<Expr> {
        expect_at_least(self.name(), args, 1)?;
        let map = as_map(self.name(), &args[0])?;
        map.dissoc_in_place(&args[1..])?;
        Ok(args[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(name: &str) -> Expr {
        Expr::keyword(name)
    }

    #[test]
    fn test_hash_map_is_mutable() {
        let map = HashMapTool.execute(&[kw("a"), Expr::Int(1)]).unwrap();
        AssocBangTool
            .execute(&[map.clone(), kw("b"), Expr::Int(2)])
            .unwrap();
        assert_eq!(
            GetTool.execute(&[map.clone(), kw("b")]).unwrap(),
            Expr::Int(2)
        );
        DissocBangTool.execute(&[map.clone(), kw("a")]).unwrap();
        assert_eq!(
            ContainspTool.execute(&[map, kw("a")]).unwrap(),
            Expr::False
        );
    }

    #[test]
    fn test_immutable_map_rejects_bang_ops() {
        let map = Expr::Map(Map::from_pairs(vec![(kw("a"), Expr::Int(1))], false));
        assert_eq!(
            AssocBangTool.execute(&[map.clone(), kw("b"), Expr::Int(2)]),
            Err(Error::ImmutableMutation)
        );
        assert_eq!(
            DissocBangTool.execute(&[map, kw("a")]),
            Err(Error::ImmutableMutation)
        );
    }

    #[test]
    fn test_assoc_returns_new_map() {
        let map = Expr::Map(Map::from_pairs(vec![(kw("a"), Expr::Int(1))], false));
        let bigger = AssocTool
            .execute(&[map.clone(), kw("b"), Expr::Int(2)])
            .unwrap();
        assert_eq!(
            KeysTool.execute(&[bigger]).unwrap(),
            Expr::seq(vec![kw("a"), kw("b")])
        );
        assert_eq!(
            ValsTool.execute(&[map]).unwrap(),
            Expr::seq(vec![Expr::Int(1)])
        );
    }

    #[test]
    fn test_get_default_and_nil() {
        let map = HashMapTool.execute(&[]).unwrap();
        assert_eq!(GetTool.execute(&[map.clone(), kw("x")]).unwrap(), Expr::Nil);
        assert_eq!(
            GetTool.execute(&[map, kw("x"), Expr::Int(0)]).unwrap(),
            Expr::Int(0)
        );
        assert_eq!(GetTool.execute(&[Expr::Nil, kw("x")]).unwrap(), Expr::Nil);
    }

    #[test]
    fn test_odd_pairs_rejected() {
        assert!(matches!(
            HashMapTool.execute(&[kw("a")]),
            Err(Error::InvalidArguments { .. })
        ));
    }
}
