//! Ruby syntax tree of a Vagrantfile.

/// A literal value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Double-quoted string
    Str(String),
    Int(u64),
    /// `:name`
    Symbol(String),
    /// Ruby expression written as is (variable names, array literals)
    Raw(String),
}

impl Literal {
    pub fn str(value: impl Into<String>) -> Self {
        Literal::Str(value.into())
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Literal::Raw(value.into())
    }
}

/// Positional or keyword argument of a method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub keyword: Option<String>,
    pub value: Literal,
}

impl Argument {
    pub fn positional(value: Literal) -> Self {
        Self { keyword: None, value }
    }

    pub fn keyword(keyword: impl Into<String>, value: Literal) -> Self {
        Self {
            keyword: Some(keyword.into()),
            value,
        }
    }
}

/// Statement inside a block, applied to the block variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// `var.name = value`
    Attribute { name: String, value: Literal },
    /// `var.name arg, key: arg`
    Call { name: String, arguments: Vec<Argument> },
    Block(Block),
}

impl Element {
    pub fn attribute(name: impl Into<String>, value: Literal) -> Self {
        Element::Attribute {
            name: name.into(),
            value,
        }
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Element::Call {
            name: name.into(),
            arguments,
        }
    }
}

/// `parent.receiver "label" do |variable| ... end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub receiver: String,
    pub label: Option<String>,
    pub variable: String,
    pub content: Vec<Element>,
    /// Comment written above the block
    pub note: Option<String>,
}

impl Block {
    pub fn new(receiver: impl Into<String>, label: Option<String>, variable: impl Into<String>, content: Vec<Element>) -> Self {
        Self {
            receiver: receiver.into(),
            label,
            variable: variable.into(),
            content,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Array of strings stored under a hash key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyArray {
    pub name: String,
    pub items: Vec<String>,
}

/// Top-level hash variable, e.g. the Ansible groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyHash {
    pub name: String,
    pub entries: Vec<RubyArray>,
}

impl RubyHash {
    pub fn get(&self, key: &str) -> Option<&RubyArray> {
        self.entries.iter().find(|entry| entry.name == key)
    }
}

/// Complete Vagrantfile: variables followed by the `Vagrant.configure` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vagrantfile {
    pub variables: Vec<RubyHash>,
    pub root: Block,
}
