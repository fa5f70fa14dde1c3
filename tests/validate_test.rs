use std::path::Path;
use tscat::validate::has_errors;
use tscat::{validate, IssueKind, Severity, TsParser};

#[test]
fn test_fixtures_are_clean() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/languages");
    for name in ["de.ts", "fr.ts", "zh_CN.ts"] {
        let catalog = TsParser::parse_file(&fixtures.join(name)).unwrap();
        let issues = validate(&catalog);
        assert!(issues.is_empty(), "{}: {:?}", name, issues);
    }
}

#[test]
fn test_issues_point_at_message_lines() {
    let content = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="ru_RU">
<context>
    <name>GMainWindow</name>
    <message>
        <source>Loading %1 of %2</source>
        <translation>Загрузка %1</translation>
    </message>
    <message>
        <source>&amp;Continue</source>
        <translation>Продолжить</translation>
    </message>
    <message numerus="yes">
        <source>%n file(s) remaining</source>
        <translation>
            <numerusform>Остался %n файл</numerusform>
            <numerusform>Осталось %n файла</numerusform>
        </translation>
    </message>
    <message>
        <source>Unfinished %1</source>
        <translation type="unfinished">Незавершено</translation>
    </message>
</context>
</TS>
"#;
    let catalog = TsParser::parse_str(content, "ru_RU.ts").unwrap();
    let issues = validate(&catalog);

    let summary: Vec<(IssueKind, usize)> = issues.iter().map(|i| (i.kind, i.line)).collect();
    assert_eq!(
        summary,
        vec![
            (IssueKind::PlaceholderMismatch, 6),
            (IssueKind::AcceleratorMismatch, 10),
            (IssueKind::NumerusFormCount, 14),
        ]
    );
    assert!(has_errors(&issues));
    assert_eq!(issues[1].severity, Severity::Warning);
    assert!(issues[2].message.contains("expects 3"));
}
