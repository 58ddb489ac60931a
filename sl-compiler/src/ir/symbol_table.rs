use crate::diagnostics::{DiagnosticSink, FatalStop, Phase, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

const HEAP_BASE: usize = 0x1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    TokenPlaceholder,
    Builtin,
    Constant,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::TokenPlaceholder => "token",
            SymbolKind::Builtin => "builtin",
            SymbolKind::Constant => "constant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: SymbolKind,
    /// Type descriptor, e.g. `float`, or a signature string for builtins.
    pub ty: String,
    pub scope_level: usize,
    /// Placeholder for an address or register; synthesized on insert when unset.
    pub storage: Option<String>,
    pub initial_value: Option<String>,
    /// Persists across scope exit. Reserved.
    pub is_state: bool,
    pub is_used: bool,
    pub decl_line: Option<usize>,
    pub is_dummy: bool,
}

impl SymbolEntry {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: ty.into(),
            scope_level: 0,
            storage: None,
            initial_value: None,
            is_state: false,
            is_used: false,
            decl_line: None,
            is_dummy: false,
        }
    }

    pub fn variable(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self::new(name, SymbolKind::Variable, ty)
    }

    pub fn declared_at(mut self, line: usize) -> Self {
        self.decl_line = Some(line);
        self
    }

    fn dummy(name: &str, kind: SymbolKind, decl_line: Option<usize>) -> Self {
        Self {
            decl_line,
            is_dummy: true,
            ..Self::new(name, kind, "unknown")
        }
    }
}

/// Stack of scope frames; frame 0 is global and is never popped.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, SymbolEntry>>,
    next_storage: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            next_storage: 0,
        }
    }

    pub fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost frame. No-op at global scope.
    pub fn end_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Current depth, 0 = global.
    pub fn current_scope(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Declare `entry` in the current frame.
    ///
    /// A name already present in the current frame is reported as a duplicate
    /// declaration and the existing entry is left untouched (`Ok(false)`).
    pub fn insert(
        &mut self,
        entry: SymbolEntry,
        diagnostics: &mut DiagnosticSink,
    ) -> Result<bool, FatalStop> {
        if let Some(existing) = self.lookup_local(&entry.name) {
            let previous = existing
                .decl_line
                .map_or_else(|| "unknown".to_string(), |l| l.to_string());
            diagnostics.report_error(
                Phase::Semantic,
                format!(
                    "Duplicate declaration of '{}'; previously declared at line {previous}",
                    entry.name
                ),
                entry.decl_line.into(),
            )?;
            return Ok(false);
        }
        self.place(entry);
        Ok(true)
    }

    /// Add `entry` to the current frame, assigning scope level and storage.
    /// Caller guarantees the name is free in that frame.
    fn place(&mut self, mut entry: SymbolEntry) {
        entry.scope_level = self.current_scope();
        if entry.storage.is_none() {
            let index = self.next_storage;
            self.next_storage += 1;
            let heap = entry.kind == SymbolKind::Variable && (entry.is_state || entry.scope_level == 0);
            entry.storage = Some(if heap {
                format!("0x{:x}", HEAP_BASE + index)
            } else {
                format!("stk{index}")
            });
        }
        if let Some(frame) = self.scopes.last_mut() {
            frame.insert(entry.name.clone(), entry);
        }
    }

    /// Register a forward-reference placeholder unless the name already
    /// exists in the current frame.
    pub fn insert_token_placeholder(&mut self, name: &str, line: usize) -> bool {
        if self.exists_in_current_scope(name) {
            return false;
        }
        self.place(SymbolEntry::dummy(name, SymbolKind::TokenPlaceholder, Some(line)));
        true
    }

    /// Innermost-to-outermost search.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }

    /// Search the current frame only.
    pub fn lookup_local(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.last().and_then(|frame| frame.get(name))
    }

    pub fn lookup_local_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.scopes.last_mut().and_then(|frame| frame.get_mut(name))
    }

    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.lookup_local(name).is_some()
    }

    /// Flag `name` as used.
    ///
    /// An unresolved name is reported as undeclared and a used dummy entry is
    /// placed in the global frame so later lookups resolve without
    /// re-reporting.
    pub fn mark_used(&mut self, name: &str, diagnostics: &mut DiagnosticSink) -> Result<(), FatalStop> {
        self.mark_used_at(name, Position::UNKNOWN, diagnostics)
    }

    /// [`mark_used`](Self::mark_used), reporting an undeclared name at `position`.
    pub fn mark_used_at(
        &mut self,
        name: &str,
        position: Position,
        diagnostics: &mut DiagnosticSink,
    ) -> Result<(), FatalStop> {
        if let Some(entry) = self.lookup_mut(name) {
            entry.is_used = true;
            return Ok(());
        }

        let mut dummy = SymbolEntry::dummy(name, SymbolKind::Variable, position.line);
        dummy.is_used = true;
        self.scopes[0].insert(name.to_string(), dummy);

        diagnostics.report_error(
            Phase::Semantic,
            format!("Undeclared identifier '{name}' used"),
            position,
        )
    }

    /// Mutate the current-frame entry for `name` in place, first declaring a
    /// dummy variable there if the frame has none.
    pub fn update_entry<F>(&mut self, name: &str, update: F)
    where
        F: FnOnce(&mut SymbolEntry),
    {
        if !self.exists_in_current_scope(name) {
            self.place(SymbolEntry::dummy(name, SymbolKind::Variable, None));
        }
        if let Some(entry) = self.lookup_local_mut(name) {
            update(entry);
        }
    }

    /// Every entry not flagged as used, innermost frame first.
    pub fn unused_entries(&self) -> Vec<SymbolEntry> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|frame| sorted(frame).into_iter().filter(|e| !e.is_used).cloned())
            .collect()
    }

    /// All live entries, outermost frame first, sorted by name within a frame.
    pub fn entries(&self) -> Vec<&SymbolEntry> {
        self.scopes.iter().flat_map(sorted).collect()
    }

    pub fn dump(&self) -> String {
        let mut out = String::from("=== Symbol Table Dump ===\n");
        for (level, frame) in self.scopes.iter().enumerate() {
            let _ = writeln!(out, "Scope level {level}:");
            for e in sorted(frame) {
                let _ = write!(
                    out,
                    "  name='{}' kind='{}' type='{}' addr='{}' scope={} decl_line={} is_state={} is_used={}",
                    e.name,
                    e.kind.as_str(),
                    e.ty,
                    e.storage.as_deref().unwrap_or(""),
                    e.scope_level,
                    e.decl_line.map_or_else(|| "-".to_string(), |l| l.to_string()),
                    if e.is_state { "yes" } else { "no" },
                    if e.is_used { "yes" } else { "no" },
                );
                if e.is_dummy {
                    out.push_str(" [DUMMY]");
                }
                if let Some(v) = &e.initial_value {
                    let _ = write!(out, " value='{v}'");
                }
                out.push('\n');
            }
        }
        out.push_str("=========================\n");
        out
    }

    /// Reset to a single empty global frame and restart storage numbering.
    pub fn clear(&mut self) {
        self.scopes.clear();
        self.scopes.push(HashMap::new());
        self.next_storage = 0;
    }
}

fn sorted(frame: &HashMap<String, SymbolEntry>) -> Vec<&SymbolEntry> {
    let mut entries: Vec<&SymbolEntry> = frame.values().collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
