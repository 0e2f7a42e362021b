//! Recursive-descent parser over the lexer's spanned tokens
//!
//! `parse` raises on the first syntax error; `parse_recovering` collects
//! every error it can find by resynchronizing on statement boundaries.

use crate::ast::*;
use crate::lexer::{line_col, tokenize, SpannedToken, Token};
use quiver_core::{Error, Result};

/// Parse a single statement
pub fn parse_statement(input: &str) -> Result<Statement> {
    let mut statements = parse(input)?;
    match statements.pop() {
        Some(statement) if statements.is_empty() => Ok(statement),
        Some(_) => Err(Error::syntax(
            1,
            1,
            format!("expected one statement, found {}", statements.len() + 1),
        )),
        None => Err(Error::syntax(1, 1, "expected one statement, found none")),
    }
}

/// Parse a program of `;`-separated statements, raising on the first error
pub fn parse(input: &str) -> Result<Vec<Statement>> {
    let mut parser = Parser::new(input)?;
    let mut statements = Vec::new();
    while !parser.at_end() {
        if parser.consume(&Token::Semicolon) {
            continue;
        }
        statements.push(parser.parse_statement()?);
    }
    Ok(statements)
}

/// Parse a program, collecting every syntax error found by resynchronizing
/// on `;`. Statements that parsed cleanly are still returned.
pub fn parse_recovering(input: &str) -> (Vec<Statement>, Vec<Error>) {
    let mut parser = match Parser::new(input) {
        Ok(parser) => parser,
        Err(err) => return (Vec::new(), vec![err]),
    };
    let mut statements = Vec::new();
    let mut errors = Vec::new();
    while !parser.at_end() {
        if parser.consume(&Token::Semicolon) {
            continue;
        }
        match parser.parse_statement() {
            Ok(statement) => statements.push(statement),
            Err(err) => {
                errors.push(err);
                parser.synchronize();
            }
        }
    }
    (statements, errors)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Result<Self> {
        Ok(Self {
            src,
            tokens: tokenize(src)?,
            pos: 0,
        })
    }

    // ========== Statements ==========

    fn parse_statement(&mut self) -> Result<Statement> {
        let statement = match self.peek() {
            Some(Token::Select) => Statement::Select(self.parse_select()?),
            Some(Token::Insert) => self.parse_insert()?,
            Some(Token::Delete) => self.parse_delete()?,
            Some(Token::Create) => self.parse_create_view()?,
            _ => return Err(self.error_here("expected SELECT, INSERT, DELETE, or CREATE")),
        };
        // Statements end at `;` or end of input
        if !self.at_end() && !self.consume(&Token::Semicolon) {
            return Err(self.error_here("expected ';' or end of statement"));
        }
        Ok(statement)
    }

    fn parse_select(&mut self) -> Result<SelectStmt> {
        self.expect(&Token::Select)?;

        let projection = if self.consume(&Token::Path) {
            Projection::Path
        } else {
            Projection::Columns(self.parse_select_items()?)
        };

        self.expect(&Token::From)?;
        let from = self.parse_sources()?;

        let matches = if self.consume(&Token::Match) {
            self.parse_match_edges()?
        } else {
            Vec::new()
        };

        let predicate = if self.consume(&Token::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(SelectStmt {
            projection,
            from,
            matches,
            predicate,
        })
    }

    fn parse_select_items(&mut self) -> Result<Vec<SelectItem>> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let alias = if self.consume(&Token::As) {
                Some(self.identifier()?)
            } else {
                None
            };
            items.push(SelectItem { expr, alias });
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_sources(&mut self) -> Result<Vec<SourceDecl>> {
        let mut sources = Vec::new();
        loop {
            let label = if self.consume(&Token::Star) {
                None
            } else {
                Some(self.identifier()?)
            };
            // Alias: `AS a`, a bare trailing identifier, or the label itself
            let alias = if self.consume(&Token::As) {
                self.identifier()?
            } else if let Some(name) = self.peek().and_then(Token::as_identifier) {
                let name = name.to_string();
                self.advance();
                name
            } else {
                match &label {
                    Some(name) => name.clone(),
                    None => return Err(self.error_here("the global view '*' requires an alias")),
                }
            };
            sources.push(SourceDecl { label, alias });
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        Ok(sources)
    }

    fn parse_match_edges(&mut self) -> Result<Vec<MatchEdge>> {
        let mut edges = Vec::new();
        loop {
            edges.push(self.parse_match_edge()?);
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        Ok(edges)
    }

    /// `src-[label[*min..max] [AS bound]]->sink`, aliases optionally bracketed
    fn parse_match_edge(&mut self) -> Result<MatchEdge> {
        let source_alias = self.bracketed_identifier()?;
        self.expect(&Token::Minus)?;
        self.expect(&Token::LBracket)?;
        let label = self.identifier()?;
        let repetition = if self.consume(&Token::Star) {
            self.parse_repetition()?
        } else {
            Repetition::single()
        };
        let bound = if self.consume(&Token::As) {
            Some(self.identifier()?)
        } else {
            None
        };
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Arrow)?;
        let sink_alias = self.bracketed_identifier()?;
        Ok(MatchEdge {
            source_alias,
            label,
            repetition,
            bound,
            sink_alias,
        })
    }

    /// After `*`: `` | `n` | `n..` | `n..m` | `..m`
    fn parse_repetition(&mut self) -> Result<Repetition> {
        let min = if let Some(Token::Integer(n)) = self.peek() {
            let n = *n;
            self.advance();
            Some(self.integer_bound(n)?)
        } else {
            None
        };
        if self.consume(&Token::DotDot) {
            let max = if let Some(Token::Integer(n)) = self.peek() {
                let n = *n;
                self.advance();
                Some(self.integer_bound(n)?)
            } else {
                None
            };
            Ok(Repetition {
                min: min.unwrap_or(1),
                max,
            })
        } else {
            match min {
                // `*n` is exactly n hops
                Some(n) => Ok(Repetition { min: n, max: Some(n) }),
                // bare `*` is one-or-more
                None => Ok(Repetition { min: 1, max: None }),
            }
        }
    }

    fn integer_bound(&self, n: i64) -> Result<u32> {
        u32::try_from(n).map_err(|_| self.error_here("repetition bound out of range"))
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.expect(&Token::Insert)?;
        if self.consume(&Token::Edge) {
            return Ok(Statement::InsertEdge(self.parse_insert_edge()?));
        }
        self.expect(&Token::Into)?;
        let label = self.identifier()?;

        self.expect(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.identifier()?);
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;

        self.expect(&Token::Values)?;
        let mut values = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let mut row = Vec::new();
            loop {
                row.push(self.parse_literal()?);
                if !self.consume(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
            if row.len() != columns.len() {
                return Err(self.error_here(format!(
                    "VALUES row has {} values for {} columns",
                    row.len(),
                    columns.len()
                )));
            }
            values.push(row);
            if !self.consume(&Token::Comma) {
                break;
            }
        }

        Ok(Statement::InsertNode(InsertNodeStmt {
            label,
            columns,
            values,
        }))
    }

    /// `INSERT EDGE INTO src.edge SELECT a, b [, key = lit ...] FROM ... [WHERE ...]`
    fn parse_insert_edge(&mut self) -> Result<InsertEdgeStmt> {
        self.expect(&Token::Into)?;
        let source_label = self.identifier()?;
        self.expect(&Token::Dot)?;
        let edge_label = self.identifier()?;

        self.expect(&Token::Select)?;
        let source_alias = self.identifier()?;
        self.expect(&Token::Comma)?;
        let sink_alias = self.identifier()?;

        let mut properties = Vec::new();
        while self.consume(&Token::Comma) {
            let key = self.identifier()?;
            self.expect(&Token::Equals)?;
            properties.push((key, self.parse_literal()?));
        }

        self.expect(&Token::From)?;
        let from = self.parse_sources()?;

        let predicate = if self.consume(&Token::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(InsertEdgeStmt {
            source_label,
            edge_label,
            source_alias,
            sink_alias,
            properties,
            from,
            predicate,
        })
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        self.expect(&Token::Delete)?;
        if self.consume(&Token::Edge) {
            let edge = self.parse_match_edge()?;
            self.expect(&Token::From)?;
            let from = self.parse_sources()?;
            let predicate = if self.consume(&Token::Where) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            return Ok(Statement::DeleteEdge(DeleteEdgeStmt {
                edge,
                from,
                predicate,
            }));
        }

        self.expect(&Token::From)?;
        let label = self.identifier()?;
        let predicate = if self.consume(&Token::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Statement::DeleteNodes(DeleteNodesStmt { label, predicate }))
    }

    /// `CREATE NODE VIEW name AS arm UNION ALL arm ...` and the edge form
    /// `CREATE EDGE VIEW owner.name AS ...`
    fn parse_create_view(&mut self) -> Result<Statement> {
        self.expect(&Token::Create)?;
        let is_edge = match self.peek() {
            Some(Token::Node) => {
                self.advance();
                false
            }
            Some(Token::Edge) => {
                self.advance();
                true
            }
            _ => return Err(self.error_here("expected NODE VIEW or EDGE VIEW")),
        };
        self.expect(&Token::View)?;

        let first = self.identifier()?;
        let (owner, name) = if is_edge && self.consume(&Token::Dot) {
            (Some(first), self.identifier()?)
        } else {
            (None, first)
        };

        self.expect(&Token::As)?;
        let mut arms = vec![self.parse_view_arm()?];
        while self.consume(&Token::Union) {
            self.expect(&Token::All)?;
            arms.push(self.parse_view_arm()?);
        }

        let stmt = CreateViewStmt { name, owner, arms };
        if is_edge {
            Ok(Statement::CreateEdgeView(stmt))
        } else {
            Ok(Statement::CreateNodeView(stmt))
        }
    }

    /// `SELECT * FROM label [alias] [WHERE pred]`; arm predicates are
    /// normalized to reference the base label as their alias
    fn parse_view_arm(&mut self) -> Result<ViewArm> {
        self.expect(&Token::Select)?;
        self.expect(&Token::Star)?;
        self.expect(&Token::From)?;
        let label = self.identifier()?;
        let alias = if let Some(name) = self.peek().and_then(Token::as_identifier) {
            let name = name.to_string();
            self.advance();
            name
        } else {
            label.clone()
        };
        let predicate = if self.consume(&Token::Where) {
            let mut expr = self.parse_expr()?;
            expr.rename_alias(&alias, &label);
            Some(expr)
        } else {
            None
        };
        Ok(ViewArm { label, predicate })
    }

    // ========== Expressions ==========

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.consume(&Token::Or) {
            let right = self.parse_and()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_not()?;
        while self.consume(&Token::And) {
            let right = self.parse_not()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.consume(&Token::Not) {
            Ok(Expr::Not(Box::new(self.parse_not()?)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_primary()?;

        if self.consume(&Token::Is) {
            let negated = self.consume(&Token::Not);
            self.expect(&Token::Null)?;
            return Ok(Expr::IsNull {
                expr: Box::new(left),
                negated,
            });
        }

        let op = match self.peek() {
            Some(Token::Equals) => BinaryOp::Eq,
            Some(Token::NotEquals) | Some(Token::NotEquals2) => BinaryOp::Ne,
            Some(Token::LessThan) => BinaryOp::Lt,
            Some(Token::LessEquals) => BinaryOp::Le,
            Some(Token::GreaterThan) => BinaryOp::Gt,
            Some(Token::GreaterEquals) => BinaryOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_primary()?;
        Ok(Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        if self.consume(&Token::LParen) {
            let expr = self.parse_expr()?;
            self.expect(&Token::RParen)?;
            return Ok(expr);
        }

        if let Some(literal) = self.try_parse_literal()? {
            return Ok(Expr::Literal(literal));
        }

        let alias = self.identifier()?;
        if self.consume(&Token::Dot) {
            let key = self.identifier()?;
            Ok(Expr::Property { alias, key })
        } else {
            Ok(Expr::Alias(alias))
        }
    }

    fn parse_literal(&mut self) -> Result<Literal> {
        match self.try_parse_literal()? {
            Some(literal) => Ok(literal),
            None => Err(self.error_here("expected a literal value")),
        }
    }

    fn try_parse_literal(&mut self) -> Result<Option<Literal>> {
        let negative = matches!(self.peek(), Some(Token::Minus));
        let lookahead = if negative { self.pos + 1 } else { self.pos };
        let literal = match self.tokens.get(lookahead).map(|t| &t.token) {
            Some(Token::Integer(n)) => Literal::Integer(if negative { -n } else { *n }),
            Some(Token::Float(f)) => Literal::Float(if negative { -f } else { *f }),
            Some(Token::StringSingle(s)) | Some(Token::StringDouble(s)) if !negative => {
                Literal::String(s.clone())
            }
            Some(Token::True) if !negative => Literal::Boolean(true),
            Some(Token::False) if !negative => Literal::Boolean(false),
            Some(Token::Null) if !negative => Literal::Null,
            _ => return Ok(None),
        };
        self.pos = lookahead + 1;
        Ok(Some(literal))
    }

    // ========== Token helpers ==========

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.consume(token) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected {token:?}")))
        }
    }

    fn identifier(&mut self) -> Result<String> {
        match self.peek().and_then(Token::as_identifier) {
            Some(name) => {
                let name = name.to_string();
                self.advance();
                Ok(name)
            }
            None => Err(self.error_here("expected an identifier")),
        }
    }

    /// Alias that may appear bare or wrapped in brackets (`[a]`)
    fn bracketed_identifier(&mut self) -> Result<String> {
        if self.consume(&Token::LBracket) {
            let name = self.identifier()?;
            self.expect(&Token::RBracket)?;
            Ok(name)
        } else {
            self.identifier()
        }
    }

    /// Skip forward to just past the next `;` so recovery can continue
    fn synchronize(&mut self) {
        while let Some(token) = self.peek() {
            let done = *token == Token::Semicolon;
            self.advance();
            if done {
                break;
            }
        }
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        let offset = self
            .tokens
            .get(self.pos)
            .map(|t| t.span.start)
            .unwrap_or(self.src.len());
        let (line, column) = line_col(self.src, offset);
        Error::syntax(line, column, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_select() {
        let stmt = parse_statement("SELECT n.name FROM App AS n").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.from.len(), 1);
        assert_eq!(select.from[0].label.as_deref(), Some("App"));
        assert_eq!(select.from[0].alias, "n");
        assert!(select.matches.is_empty());
        assert!(select.predicate.is_none());
    }

    #[test]
    fn test_parse_select_match_where() {
        let stmt = parse_statement(
            "SELECT a.name, b.name FROM App a, App b \
             MATCH a-[develop AS d]->b WHERE a.system = 'S1'",
        )
        .unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.from.len(), 2);
        assert_eq!(select.matches.len(), 1);
        let edge = &select.matches[0];
        assert_eq!(edge.source_alias, "a");
        assert_eq!(edge.sink_alias, "b");
        assert_eq!(edge.label, "develop");
        assert_eq!(edge.bound.as_deref(), Some("d"));
        assert!(edge.repetition.is_single());
        assert!(select.predicate.is_some());
    }

    #[test]
    fn test_parse_repetition_forms() {
        let rep = |text: &str| {
            let stmt = parse_statement(&format!(
                "SELECT a FROM App a, App b MATCH a-[develop{text}]->b"
            ))
            .unwrap();
            let Statement::Select(select) = stmt else {
                panic!("expected SELECT");
            };
            select.matches[0].repetition
        };

        assert_eq!(rep(""), Repetition::single());
        assert_eq!(rep("*"), Repetition::at_least(1));
        assert_eq!(rep("*3"), Repetition::range(3, 3));
        assert_eq!(rep("*1..4"), Repetition::range(1, 4));
        assert_eq!(rep("*2.."), Repetition::at_least(2));
        assert_eq!(rep("*..4"), Repetition::range(1, 4));
    }

    #[test]
    fn test_parse_global_view_source() {
        let stmt = parse_statement("SELECT n FROM * AS n").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.from[0].label, None);
        assert_eq!(select.from[0].alias, "n");
    }

    #[test]
    fn test_parse_path_projection() {
        let stmt =
            parse_statement("SELECT PATH FROM App a, App b MATCH a-[develop*1..3]->b").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.projection, Projection::Path);
    }

    #[test]
    fn test_parse_insert_node_bulk() {
        let stmt = parse_statement(
            "INSERT INTO App (name, system) VALUES ('A', 'S1'), ('B', 'S1')",
        )
        .unwrap();
        let Statement::InsertNode(insert) = stmt else {
            panic!("expected INSERT");
        };
        assert_eq!(insert.label, "App");
        assert_eq!(insert.columns, vec!["name", "system"]);
        assert_eq!(insert.values.len(), 2);
    }

    #[test]
    fn test_parse_insert_node_arity_mismatch() {
        let err =
            parse_statement("INSERT INTO App (name) VALUES ('A', 'extra')").unwrap_err();
        assert!(err.is_compile_time());
    }

    #[test]
    fn test_parse_insert_edge() {
        let stmt = parse_statement(
            "INSERT EDGE INTO App.develop SELECT a, b, since = 2020 \
             FROM App a, App b WHERE a.name = 'A' AND b.name = 'B'",
        )
        .unwrap();
        let Statement::InsertEdge(insert) = stmt else {
            panic!("expected INSERT EDGE");
        };
        assert_eq!(insert.source_label, "App");
        assert_eq!(insert.edge_label, "develop");
        assert_eq!(insert.source_alias, "a");
        assert_eq!(insert.sink_alias, "b");
        assert_eq!(insert.properties, vec![("since".to_string(), Literal::Integer(2020))]);
    }

    #[test]
    fn test_parse_delete_forms() {
        let stmt = parse_statement("DELETE FROM App WHERE App.name = 'A'").unwrap();
        assert!(matches!(stmt, Statement::DeleteNodes(_)));

        let stmt = parse_statement(
            "DELETE EDGE [a]-[Clients]->[c] FROM App a, App c \
             WHERE a.name = 'A' AND c.name = 'C'",
        )
        .unwrap();
        let Statement::DeleteEdge(delete) = stmt else {
            panic!("expected DELETE EDGE");
        };
        assert_eq!(delete.edge.source_alias, "a");
        assert_eq!(delete.edge.label, "Clients");
        assert_eq!(delete.edge.sink_alias, "c");
    }

    #[test]
    fn test_parse_create_node_view() {
        let stmt = parse_statement(
            "CREATE NODE VIEW Software AS \
             SELECT * FROM App WHERE App.active = TRUE \
             UNION ALL SELECT * FROM Service",
        )
        .unwrap();
        let Statement::CreateNodeView(view) = stmt else {
            panic!("expected CREATE NODE VIEW");
        };
        assert_eq!(view.name, "Software");
        assert_eq!(view.arms.len(), 2);
        assert_eq!(view.arms[0].label, "App");
        assert!(view.arms[0].predicate.is_some());
        assert!(view.arms[1].predicate.is_none());
    }

    #[test]
    fn test_parse_create_edge_view() {
        let stmt = parse_statement(
            "CREATE EDGE VIEW App.relies AS SELECT * FROM develop UNION ALL SELECT * FROM Clients",
        )
        .unwrap();
        let Statement::CreateEdgeView(view) = stmt else {
            panic!("expected CREATE EDGE VIEW");
        };
        assert_eq!(view.owner.as_deref(), Some("App"));
        assert_eq!(view.name, "relies");
        assert_eq!(view.arms.len(), 2);
    }

    #[test]
    fn test_view_arm_alias_normalized() {
        let stmt = parse_statement(
            "CREATE NODE VIEW Active AS SELECT * FROM App a WHERE a.active = TRUE",
        )
        .unwrap();
        let Statement::CreateNodeView(view) = stmt else {
            panic!("expected CREATE NODE VIEW");
        };
        // The arm alias `a` is rewritten to the base label
        let predicate = view.arms[0].predicate.as_ref().unwrap();
        assert!(predicate.only_references("App"));
    }

    #[test]
    fn test_syntax_error_carries_position() {
        let err = parse_statement("SELECT n FROM").unwrap_err();
        match err {
            Error::Syntax { line, column, .. } => {
                assert_eq!(line, 1);
                assert_eq!(column, 14);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_recovering_collects_errors() {
        let (statements, errors) = parse_recovering(
            "SELECT n FROM App n; SELECT FROM; DELETE FROM App; INSERT BOGUS;",
        );
        assert_eq!(statements.len(), 2);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.is_compile_time()));
    }

    #[test]
    fn test_expression_precedence() {
        let stmt = parse_statement(
            "SELECT n FROM App n WHERE n.a = 1 OR n.b = 2 AND NOT n.c = 3",
        )
        .unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        // OR binds loosest
        let Some(Expr::Binary { op: BinaryOp::Or, .. }) = select.predicate else {
            panic!("expected OR at the top");
        };
    }

    #[test]
    fn test_negative_literals() {
        let stmt = parse_statement("SELECT n FROM App n WHERE n.delta = -4").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let Some(Expr::Binary { right, .. }) = select.predicate else {
            panic!("expected comparison");
        };
        assert_eq!(*right, Expr::Literal(Literal::Integer(-4)));
    }
}
