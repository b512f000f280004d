//! Rendering of the Vagrantfile tree to Ruby source.

use super::types::{Argument, Block, Element, Literal, RubyHash, Vagrantfile};
use std::fmt::{self, Write};

const INDENT: &str = "  ";

/// Quote a string as a double-quoted Ruby literal
pub fn ruby_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '#' => quoted.push_str("\\#"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(value) => f.write_str(&ruby_string(value)),
            Literal::Int(value) => write!(f, "{}", value),
            Literal::Symbol(value) => write!(f, ":{}", value),
            Literal::Raw(value) => f.write_str(value),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.keyword {
            Some(keyword) => write!(f, "{}: {}", keyword, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

fn write_hash(out: &mut impl Write, hash: &RubyHash) -> fmt::Result {
    writeln!(out, "{} = {{", hash.name)?;
    for entry in &hash.entries {
        let items: Vec<String> = entry.items.iter().map(|item| ruby_string(item)).collect();
        writeln!(out, "{}{} => [{}],", INDENT, ruby_string(&entry.name), items.join(", "))?;
    }
    writeln!(out, "}}")
}

fn write_block(out: &mut impl Write, block: &Block, parent: &str, depth: usize) -> fmt::Result {
    let indent = INDENT.repeat(depth);
    if let Some(note) = &block.note {
        writeln!(out, "{}# {}", indent, note)?;
    }
    write!(out, "{}{}.{}", indent, parent, block.receiver)?;
    if let Some(label) = &block.label {
        write!(out, " {}", ruby_string(label))?;
    }
    writeln!(out, " do |{}|", block.variable)?;

    let inner = INDENT.repeat(depth + 1);
    for (position, element) in block.content.iter().enumerate() {
        match element {
            Element::Attribute { name, value } => {
                writeln!(out, "{}{}.{} = {}", inner, block.variable, name, value)?;
            }
            Element::Call { name, arguments } => {
                let arguments: Vec<String> = arguments.iter().map(ToString::to_string).collect();
                writeln!(out, "{}{}.{} {}", inner, block.variable, name, arguments.join(", "))?;
            }
            Element::Block(child) => {
                if child.note.is_some() && position > 0 {
                    writeln!(out)?;
                }
                write_block(out, child, &block.variable, depth + 1)?;
            }
        }
    }

    writeln!(out, "{}end", indent)
}

impl fmt::Display for Vagrantfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# -*- mode: ruby -*-")?;
        writeln!(f, "# vi: set ft=ruby :")?;
        for variable in &self.variables {
            writeln!(f)?;
            write_hash(f, variable)?;
        }
        writeln!(f)?;
        write_block(f, &self.root, "Vagrant", 0)
    }
}
