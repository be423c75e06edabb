use std::fmt;

/// Error codes for all front-end diagnostics.
///
/// Format: E#### / W#### where the first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Syntax errors reported by the grammar automaton
/// - E2xxx: Scope and semantic errors found while building nodes
/// - E9xxx: Internal errors
/// - W0xxx: Lexer warnings
/// - W1xxx: Builder warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string, regexp, symbol or word list
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid number literal
    E0003,
    /// Invalid escape sequence
    E0004,
    /// Unknown `%` literal type
    E0005,
    /// Embedded document meets end of file
    E0006,
    /// Unknown encoding in magic comment
    E0007,
    /// Invalid instance, class or global variable name
    E0008,
    /// Unterminated heredoc
    E0009,
    /// Unknown regexp option
    E0010,

    // Syntax Errors (E1xxx)
    /// Syntax error reported by the grammar automaton
    E1001,

    // Semantic Errors (E2xxx)
    /// Duplicated argument name
    E2001,
    /// Formal argument cannot be a constant or a non-local variable
    E2002,
    /// Dynamic constant assignment
    E2003,
    /// Assignment to a pseudo-variable
    E2004,
    /// Void value expression
    E2005,
    /// Block given twice
    E2006,
    /// Singleton method on a literal
    E2007,
    /// Class or module name is not a constant
    E2008,
    /// Alias of a numbered match variable
    E2009,
    /// Control keyword used in an invalid place
    E2010,
    /// Block argument where none is allowed
    E2011,
    /// Class or module definition inside a method body
    E2012,

    // Internal Errors (E9xxx)
    /// Internal error
    E9001,
    /// Too many errors
    E9002,

    // Lexer Warnings (W0xxx)
    /// Ambiguous operator interpretation
    W0001,
    /// Invalid character literal syntax
    W0002,
    /// Float literal out of range
    W0003,

    // Builder Warnings (W1xxx)
    /// Block parameter shadows an outer local
    W1001,
    /// Useless expression in void context
    W1002,
    /// Literal used as a condition
    W1003,
    /// `END` inside a method
    W1004,
    /// `else` without `rescue`
    W1005,
    /// Statement after `return`, `break` or `next`
    W1006,
    /// Warning reported by the grammar automaton
    W1007,
}

impl ErrorCode {
    /// Check if this is a lexer error (E0xxx range).
    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Check if this is a syntax error (E1xxx range).
    pub fn is_syntax_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this code names a warning.
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }

    /// Get the code as a string (e.g., "E2001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E0010 => "E0010",
            // Syntax
            ErrorCode::E1001 => "E1001",
            // Semantic
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            // Internal
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            // Warnings
            ErrorCode::W0001 => "W0001",
            ErrorCode::W0002 => "W0002",
            ErrorCode::W0003 => "W0003",
            ErrorCode::W1001 => "W1001",
            ErrorCode::W1002 => "W1002",
            ErrorCode::W1003 => "W1003",
            ErrorCode::W1004 => "W1004",
            ErrorCode::W1005 => "W1005",
            ErrorCode::W1006 => "W1006",
            ErrorCode::W1007 => "W1007",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
