/// Source file prefix of a record line, cut at the `.step:` delimiter.
/// Example: `/data/abc/00000050_80d90bfdd2e74e709956122a_step_000`
pub type FileId = String;
/// Assembly identifier derived from a file id or read from metadata.
/// Example: `80d90bfdd2e74e709956122a`
pub type AssemblyId = String;
/// Name string captured between single quotes on a record line.
/// Examples: `Custom_Bracket_7`, `Main Body`
pub type NameString = String;
/// One word token produced by the tokenizer.
/// Examples: `custom`, `,`, `n't`
pub type Token = String;
/// Metadata column header.
/// Examples: `assembly_id`, `assembly_name`
pub type ColumnName = String;
/// Raw metadata cell text.
/// Example: `Bracket Assembly`
pub type CellValue = String;
