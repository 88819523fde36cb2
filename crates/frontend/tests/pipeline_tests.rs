//! End-to-end frontend tests: tokenize, parse, check, and print whole
//! programs the way the CLI does.

use opal_frontend::{check, parse, print_program, tokenize};

fn front(source: &str) -> opal_frontend::ast::Program {
    let mut program = parse(tokenize(source).unwrap()).unwrap();
    check(&mut program).unwrap();
    program
}

const LINKED_LIST: &str = "\
struct Node {
  int value,
  Node next
}

Node push(Node head, int value) {
  Node n = new Node
  n.value = value
  n.next = head
  return n
}

int sum(Node head) {
  int total = 0
  Node cursor = head
  while (cursor != null) {
    total = total + cursor.value
    cursor = cursor.next
  }
  return total
}

void main() {
  Node head = null
  for (int i = 1; i <= 4; i = i + 1) {
    head = push(head, i)
  }
  print(sum(head))
  while (head != null) {
    Node dead = head
    head = head.next
    delete dead
  }
}
";

#[test]
fn linked_list_program_checks() {
    front(LINKED_LIST);
}

#[test]
fn printing_checked_program_is_fixpoint() {
    let once = print_program(&front(LINKED_LIST));
    let reparsed = parse(tokenize(&once).unwrap()).unwrap();
    let twice = print_program(&reparsed);
    assert_eq!(once, twice);
}

#[test]
fn printed_program_still_checks() {
    let printed = print_program(&front(LINKED_LIST));
    front(&printed);
}

#[test]
fn ast_nodes_expose_their_tokens() {
    let program = front(LINKED_LIST);
    let name: &opal_frontend::ast::Token = &program.functions[0].name;
    assert_eq!(name.lexeme, "push");
    assert_eq!(program.structs[0].name.lexeme, "Node");
}

#[test]
fn token_listing_positions() {
    let tokens = tokenize("void main() {\n  print(42)\n}\n").unwrap();
    let listing: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    assert_eq!(listing[0], "1, 1: VOID_TYPE 'void'");
    assert_eq!(listing[5], "2, 3: ID 'print'");
    assert_eq!(listing[7], "2, 9: INT_VAL '42'");
    assert_eq!(listing.last().map(String::as_str), Some("4, 1: EOS 'end-of-stream'"));
}

#[test]
fn lex_errors_surface_through_pipeline() {
    let err = tokenize("void main() { int x = 042 }").unwrap_err();
    assert_eq!(
        err.to_string(),
        "leading zero in number at line 1, column 23"
    );
}

#[test]
fn parse_errors_carry_position() {
    let err = parse(tokenize("void main() { delete }").unwrap()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "expecting value found '}' at line 1, column 22"
    );
}

#[test]
fn check_errors_carry_position() {
    let mut program = parse(tokenize("void main() {\n  print(missing)\n}").unwrap()).unwrap();
    let err = check(&mut program).unwrap_err();
    assert_eq!(
        err.to_string(),
        "use before definition of 'missing' near line 2, column 9"
    );
}
