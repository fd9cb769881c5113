//! Renders expressions back to source-like text for diagnostics.

use crate::expression::expr::{Expression, FunctionScript, Script};
use crate::expression::operator::{BinaryOp, UnaryOp};
use crate::expression::visitor::ExpressionVisitor;
use crate::value::Value;

/// Render an expression as text
pub fn expr_to_string(expr: &Expression) -> String {
    expr.accept(&mut PrettyPrinter)
}

pub struct PrettyPrinter;

impl PrettyPrinter {
    fn operand(&mut self, expr: &Expression) -> String {
        let text = expr.accept(self);
        if matches!(expr, Expression::Binary { .. }) {
            format!("({})", text)
        } else {
            text
        }
    }

    fn list(&mut self, items: &[Expression]) -> String {
        items
            .iter()
            .map(|item| item.accept(self))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn statements(&mut self, statements: &[Expression], separator: &str) -> String {
        statements
            .iter()
            .map(|statement| statement.accept(self))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl<'e> ExpressionVisitor<'e> for PrettyPrinter {
    type Output = String;

    fn visit_const(&mut self, value: &'e Value) -> String {
        value.as_string_literal()
    }

    fn visit_var(&mut self, name: &'e str) -> String {
        name.to_string()
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &'e Expression) -> String {
        let operand = self.operand(operand);
        match op {
            UnaryOp::Minus => format!("-{}", operand),
            _ if op.is_postfix() => format!("{} {}", operand, op.as_str()),
            _ => format!("{} {}", op.as_str(), operand),
        }
    }

    fn visit_binary(&mut self, op: BinaryOp, left: &'e Expression, right: &'e Expression) -> String {
        format!("{} {} {}", self.operand(left), op.as_str(), self.operand(right))
    }

    fn visit_function_call(&mut self, name: &'e str, args: &'e [Expression]) -> String {
        format!("{}({})", name, self.list(args))
    }

    fn visit_if_else(
        &mut self,
        condition: &'e Expression,
        if_branch: &'e Expression,
        else_branch: Option<&'e Expression>,
    ) -> String {
        let mut text = format!("if {} then {}", condition.accept(self), if_branch.accept(self));
        if let Some(else_branch) = else_branch {
            text.push_str(" else ");
            text.push_str(&else_branch.accept(self));
        }
        text.push_str(" endif");
        text
    }

    fn visit_assign(&mut self, name: &'e str, value: &'e Expression) -> String {
        format!("{} = {}", name, value.accept(self))
    }

    fn visit_alias(&mut self, alias: &'e str, expression: &'e Expression) -> String {
        format!("{} : {}", alias, expression.accept(self))
    }

    fn visit_vector(&mut self, elements: &'e [Expression]) -> String {
        format!("({})", self.list(elements))
    }

    fn visit_index(&mut self, vector: &'e Expression, index: &'e Expression) -> String {
        format!("{}[{}]", self.operand(vector), index.accept(self))
    }

    fn visit_property_path(&mut self, entity: &'e str, path: &'e [String]) -> String {
        let mut text = entity.to_string();
        for segment in path {
            text.push('.');
            text.push_str(segment);
        }
        text
    }

    fn visit_projection(&mut self, elements: &'e [Expression], filter: Option<&'e Expression>) -> String {
        let mut text = format!("project {{{}}}", self.list(elements));
        if let Some(filter) = filter {
            text.push_str(" where ");
            text.push_str(&filter.accept(self));
        }
        text
    }

    fn visit_script(&mut self, script: &'e Script) -> String {
        let mut parts: Vec<String> = script
            .functions
            .values()
            .map(|function| function.accept(self))
            .collect();
        parts.push(self.statements(&script.statements, "\n"));
        parts.join("\n")
    }

    fn visit_sequence(&mut self, statements: &'e [Expression]) -> String {
        self.statements(statements, "; ")
    }

    fn visit_function_script(&mut self, function: &'e FunctionScript) -> String {
        format!(
            "function {}({})\n{{\n{}\n}}",
            function.name,
            function.parameters.join(", "),
            self.statements(&function.body, "\n")
        )
    }
}
