//! Generic structural walk over a [`Schema`].
//!
//! Implementors of [`ShapeVisitor`] override only the hooks they care about;
//! every default hook delegates to the matching `walk_*` function, which
//! descends into the node's children. An override that still wants the
//! default descent calls the `walk_*` function itself.
//!
//! Each hook receives a `focus` chosen by the implementor. The materializer
//! threads the current subject through it; a pure analysis can use `()`.

use crate::error::MapError;
use crate::schema::{
    NodeConstraint, Schema, Shape, ShapeExpr, ShapeExprRef, TripleConstraint, TripleExpr,
    TripleExprRef, TripleGroup,
};

pub trait ShapeVisitor<'s>: Sized {
    /// Per-call context passed down the walk.
    type Focus;
    type Error: From<MapError>;

    /// The schema references are resolved against.
    fn schema(&self) -> &'s Schema;

    fn visit_shape_expr(&mut self, expr: &'s ShapeExpr, focus: &Self::Focus) -> Result<(), Self::Error> {
        walk_shape_expr(self, expr, focus)
    }

    fn visit_shape_expr_ref(
        &mut self,
        expr: &'s ShapeExprRef,
        focus: &Self::Focus,
    ) -> Result<(), Self::Error> {
        walk_shape_expr_ref(self, expr, focus)
    }

    /// A reference to a labelled shape. By default the target is visited
    /// under the same focus.
    fn visit_reference(&mut self, label: &'s str, focus: &Self::Focus) -> Result<(), Self::Error> {
        walk_reference(self, label, focus)
    }

    fn visit_shape(&mut self, shape: &'s Shape, focus: &Self::Focus) -> Result<(), Self::Error> {
        walk_shape(self, shape, focus)
    }

    fn visit_node_constraint(
        &mut self,
        _nc: &'s NodeConstraint,
        _focus: &Self::Focus,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_triple_expr_ref(
        &mut self,
        expr: &'s TripleExprRef,
        focus: &Self::Focus,
    ) -> Result<(), Self::Error> {
        walk_triple_expr_ref(self, expr, focus)
    }

    /// A reference to a labelled triple expression, visited in place.
    fn visit_triple_reference(&mut self, label: &'s str, focus: &Self::Focus) -> Result<(), Self::Error> {
        walk_triple_reference(self, label, focus)
    }

    fn visit_triple_expr(&mut self, expr: &'s TripleExpr, focus: &Self::Focus) -> Result<(), Self::Error> {
        walk_triple_expr(self, expr, focus)
    }

    fn visit_each_of(&mut self, group: &'s TripleGroup, focus: &Self::Focus) -> Result<(), Self::Error> {
        walk_triple_group(self, group, focus)
    }

    fn visit_one_of(&mut self, group: &'s TripleGroup, focus: &Self::Focus) -> Result<(), Self::Error> {
        walk_triple_group(self, group, focus)
    }

    fn visit_triple_constraint(
        &mut self,
        tc: &'s TripleConstraint,
        focus: &Self::Focus,
    ) -> Result<(), Self::Error> {
        walk_triple_constraint(self, tc, focus)
    }
}

// --- default descent ---------------------------------------------------------

pub fn walk_shape_expr<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    expr: &'s ShapeExpr,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    match expr {
        ShapeExpr::Shape(shape) => v.visit_shape(shape, focus),
        ShapeExpr::NodeConstraint(nc) => v.visit_node_constraint(nc, focus),
        ShapeExpr::ShapeAnd(j) | ShapeExpr::ShapeOr(j) => {
            for e in &j.shape_exprs {
                v.visit_shape_expr_ref(e, focus)?;
            }
            Ok(())
        }
        ShapeExpr::ShapeNot(not) => v.visit_shape_expr_ref(&not.shape_expr, focus),
        ShapeExpr::ShapeExternal => Ok(()),
    }
}

pub fn walk_shape_expr_ref<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    expr: &'s ShapeExprRef,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    match expr {
        ShapeExprRef::Reference(label) => v.visit_reference(label, focus),
        ShapeExprRef::Inline(inner) => v.visit_shape_expr(inner, focus),
    }
}

pub fn walk_reference<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    label: &'s str,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    let target = v.schema().shape(label)?;
    v.visit_shape_expr(target, focus)
}

pub fn walk_shape<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    shape: &'s Shape,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    match &shape.expression {
        Some(expr) => v.visit_triple_expr_ref(expr, focus),
        None => Ok(()),
    }
}

pub fn walk_triple_expr_ref<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    expr: &'s TripleExprRef,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    match expr {
        TripleExprRef::Reference(label) => v.visit_triple_reference(label, focus),
        TripleExprRef::Inline(inner) => v.visit_triple_expr(inner, focus),
    }
}

pub fn walk_triple_reference<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    label: &'s str,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    let target = v.schema().triple_expr(label)?;
    v.visit_triple_expr(target, focus)
}

pub fn walk_triple_expr<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    expr: &'s TripleExpr,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    match expr {
        TripleExpr::TripleConstraint(tc) => v.visit_triple_constraint(tc, focus),
        TripleExpr::EachOf(group) => v.visit_each_of(group, focus),
        TripleExpr::OneOf(group) => v.visit_one_of(group, focus),
    }
}

pub fn walk_triple_group<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    group: &'s TripleGroup,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    for expr in &group.expressions {
        v.visit_triple_expr_ref(expr, focus)?;
    }
    Ok(())
}

pub fn walk_triple_constraint<'s, V: ShapeVisitor<'s>>(
    v: &mut V,
    tc: &'s TripleConstraint,
    focus: &V::Focus,
) -> Result<(), V::Error> {
    match &tc.value_expr {
        Some(expr) => v.visit_shape_expr_ref(expr, focus),
        None => Ok(()),
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Records predicates in visit order, entering each shape once.
    struct Predicates<'s> {
        schema: &'s Schema,
        entered: HashSet<&'s str>,
        seen: Vec<&'s str>,
    }

    impl<'s> ShapeVisitor<'s> for Predicates<'s> {
        type Focus = ();
        type Error = MapError;

        fn schema(&self) -> &'s Schema {
            self.schema
        }

        fn visit_reference(&mut self, label: &'s str, focus: &()) -> Result<(), MapError> {
            if self.entered.insert(label) {
                walk_reference(self, label, focus)
            } else {
                Ok(())
            }
        }

        fn visit_triple_constraint(&mut self, tc: &'s TripleConstraint, focus: &()) -> Result<(), MapError> {
            self.seen.push(&tc.predicate);
            walk_triple_constraint(self, tc, focus)
        }
    }

    fn schema() -> Schema {
        Schema::from_json(
            r#"{
                "start": "S",
                "shapes": {
                    "S": {
                        "type": "Shape",
                        "expression": {
                            "type": "OneOf",
                            "expressions": [
                                { "type": "TripleConstraint", "predicate": "p1", "valueExpr": "T" },
                                { "type": "TripleConstraint", "predicate": "p2" }
                            ]
                        }
                    },
                    "T": {
                        "type": "ShapeAnd",
                        "shapeExprs": [
                            { "type": "NodeConstraint", "nodeKind": "iri" },
                            {
                                "type": "Shape",
                                "expression": { "type": "TripleConstraint", "predicate": "p3", "valueExpr": "S" }
                            }
                        ]
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn default_walk_reaches_every_constraint() {
        let schema = schema();
        let mut v = Predicates {
            schema: &schema,
            entered: HashSet::new(),
            seen: vec![],
        };
        let (label, start) = schema.start_shape().unwrap();
        v.entered.insert(label);
        v.visit_shape_expr(start, &()).unwrap();
        assert_eq!(v.seen, vec!["p1", "p3", "p2"]);
    }

    #[test]
    fn triple_reference_is_walked_in_place() {
        let schema = Schema::from_json(
            r#"{ "shapes": {
                "S": { "type": "Shape", "expression": {
                    "type": "EachOf", "expressions": [ "e", { "type": "TripleConstraint", "predicate": "p2" } ] } },
                "T": { "type": "Shape", "expression": { "type": "TripleConstraint", "id": "e", "predicate": "p1" } }
            } }"#,
        )
        .unwrap();
        let mut v = Predicates {
            schema: &schema,
            entered: HashSet::new(),
            seen: vec![],
        };
        v.visit_shape_expr(schema.shape("S").unwrap(), &()).unwrap();
        assert_eq!(v.seen, vec!["p1", "p2"]);
    }

    #[test]
    fn dangling_reference_is_an_error() {
        let schema = Schema::from_json(
            r#"{ "shapes": { "S": { "type": "Shape",
                 "expression": { "type": "TripleConstraint", "predicate": "p", "valueExpr": "Missing" } } } }"#,
        )
        .unwrap();
        let mut v = Predicates {
            schema: &schema,
            entered: HashSet::new(),
            seen: vec![],
        };
        let err = v.visit_shape_expr(schema.shape("S").unwrap(), &()).unwrap_err();
        assert_eq!(err, MapError::UnknownShape("Missing".into()));
    }
}
