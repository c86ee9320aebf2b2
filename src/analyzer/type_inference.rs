use crate::{
    analyzer::FieldLookup,
    metadata::FieldType,
    parser::ast::{Expression, FunctionCall, Literal, QueryFacts, UnaryOp},
};

/// Static type of an expression: `(type, nullable)`, when it can be told from
/// the entity metadata alone.
#[derive(Default)]
pub struct TypeInference;

impl TypeInference {
    pub fn infer(expression: &Expression, scopes: &[&QueryFacts]) -> Option<(FieldType, bool)> {
        match expression {
            Expression::Identifier(identifier) => {
                if let Some(resolved) = identifier.resolved() {
                    return Some((resolved.ty, resolved.nullable));
                }
                let found = FieldLookup::find(&identifier.value, scopes.iter().copied()).ok().flatten()?;
                Some((found.field.ty, found.field.nullable))
            },
            Expression::Literal(Literal::Null) => Some((FieldType::Null, true)),
            Expression::Literal(literal) => Some((FieldType::of_literal(literal), false)),
            Expression::Parameter(parameter) => parameter.ty.map(|ty| (ty, parameter.nullable.unwrap_or(true))),
            Expression::NamedParameter(named) => named.ty.map(|ty| (ty, true)),
            Expression::Arithmetic(e) => {
                let (left, left_null) = Self::infer(&e.left, scopes)?;
                let (right, right_null) = Self::infer(&e.right, scopes)?;
                Some((FieldType::promote(left, right), left_null || right_null))
            },
            Expression::Binary(_) | Expression::Logic(_) => Some((FieldType::Bool, false)),
            Expression::Unary(e) => match e.op {
                UnaryOp::Not => Some((FieldType::Bool, false)),
                UnaryOp::Negate => Self::infer(&e.operand, scopes),
            },
            Expression::Case(case) => {
                let (ty, nullable) = case.branches.first().and_then(|branch| Self::infer(&branch.then, scopes))?;
                Some((ty, nullable || case.otherwise.is_none()))
            },
            Expression::Function(function) => Self::infer_function(function, scopes),
            Expression::Subquery(select) => match select.facts.result_fields.values().next() {
                Some(column) if select.facts.result_fields.len() == 1 => column.ty.map(|ty| (ty, true)),
                _ => None,
            },
            Expression::List(_) => None,
        }
    }

    fn infer_function(function: &FunctionCall, scopes: &[&QueryFacts]) -> Option<(FieldType, bool)> {
        let name = function.name.to_ascii_lowercase();
        let args: Vec<Option<(FieldType, bool)>> = function.args.iter().map(|arg| Self::infer(arg, scopes)).collect();

        match (name.as_str(), args.as_slice()) {
            ("count", _) => Some((FieldType::Int, false)),
            ("avg", _) => Some((FieldType::Float, true)),
            ("sum" | "min" | "max", [Some((ty, _))]) => Some((*ty, true)),
            ("upper" | "lower" | "trim", [Some((FieldType::String, nullable))]) => Some((FieldType::String, *nullable)),
            ("length", [Some((_, nullable))]) => Some((FieldType::Int, *nullable)),
            ("coalesce", many) if !many.is_empty() => {
                let mut ty = FieldType::Null;
                let mut all_nullable = true;
                for (arg_ty, nullable) in many.iter().flatten().copied() {
                    ty = FieldType::promote(ty, arg_ty);
                    all_nullable = all_nullable && nullable;
                }
                Some((ty, all_nullable))
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{analyzer::TypeInference, metadata::FieldType, parser::ast::Expression};

    fn infer(text: &str) -> Option<(FieldType, bool)> {
        TypeInference::infer(&Expression::parse_fragment(text).unwrap(), &[])
    }

    #[test]
    pub fn test_literals_and_operators() {
        assert_eq!(infer("1 + 2.5"), Some((FieldType::Float, false)));
        assert_eq!(infer("'a'"), Some((FieldType::String, false)));
        assert_eq!(infer("NULL"), Some((FieldType::Null, true)));
        assert_eq!(infer("1 < 2 AND TRUE"), Some((FieldType::Bool, false)));
        assert_eq!(infer("-3"), Some((FieldType::Int, false)));
    }

    #[test]
    pub fn test_functions() {
        assert_eq!(infer("COUNT(*)"), Some((FieldType::Int, false)));
        assert_eq!(infer("UPPER('x')"), Some((FieldType::String, false)));
        assert_eq!(infer("COALESCE(NULL, 1)"), Some((FieldType::Int, false)));
        assert_eq!(infer("MYSTERY(1)"), None);
    }

    #[test]
    pub fn test_case_without_else_is_nullable() {
        assert_eq!(infer("CASE WHEN 1 = 1 THEN 'a' END"), Some((FieldType::String, true)));
        assert_eq!(infer("CASE WHEN 1 = 1 THEN 'a' ELSE 'b' END"), Some((FieldType::String, false)));
    }

    #[test]
    pub fn test_unresolved_identifier_without_scope() {
        assert_eq!(infer("name"), None);
    }
}
