//! # Mace Expression Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for Mace, a small
//! side-effect-free expression language embedded by a host application that
//! supplies identifiers and functions and receives a computed value back.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, operations, access, calls, types)
//! - **[operators]** - Prefix and binary operators with the precedence table
//!
//! ## Quick Start
//!
//! ```text
//! price * quantity > 100 ? 'bulk' : 'retail'
//! ```
//!
//! ## Precedence
//!
//! Loosest to tightest:
//!
//! ```text
//! ?:  (conditional, right-associative)
//! ||  OR
//! &&  AND
//! |
//! ^
//! &
//! ==  !=  ===  !==
//! <   <=  >    >=
//! <<  >>  >>>
//! +   -
//! *   /   %
//! **  (right-associative)
//! ~   !   NOT  +  -   (prefix)
//! .name  [key]        (accessors)
//! ```
//!
//! ## Examples
//!
//! ### Elvis
//!
//! ```text
//! nickname ?: name
//! ```
//!
//! ### Accessor Chains
//!
//! ```text
//! [[1,2,3],[4,5,6],[7,8,9]][y][x]
//! {"Jonathan": {age: 32}}[name].age
//! ```
//!
//! ### Types
//!
//! ```text
//! Map<String, List<String>> | Boolean
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;

pub use tokens::Token;
pub use expressions::{AccessorKey, Expr};
pub use operators::{BinOp, UnaryOp};
