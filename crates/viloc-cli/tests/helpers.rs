#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const CATALOG: &str = r#"# Vietnamese translation for quan_ly_van_ban
msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"

#. module: quan_ly_van_ban
#: model:ir.model.fields,field_description:quan_ly_van_ban.field_van_ban__state
msgid "Xác nhận"
msgstr ""

#. module: quan_ly_van_ban
#: model:ir.ui.menu,name:quan_ly_van_ban.menu_print
msgid "Print"
msgstr "In"
"#;

pub const GLOSSARY: &str = r#"[vi_en]
"Xác nhận" = "Confirm"

[en_vi]
"Print" = "In"
"#;

/// A small Odoo module with a catalog, one view and one model.
pub fn write_module(root: &Path) {
    fs::create_dir_all(root.join("i18n")).unwrap();
    fs::create_dir_all(root.join("views")).unwrap();
    fs::create_dir_all(root.join("models")).unwrap();
    fs::write(root.join("i18n/vi_VN.po"), CATALOG).unwrap();
    fs::write(
        root.join("views/van_ban.xml"),
        "<button string=\"Xác nhận\"/>\n<span>In</span>\n",
    )
    .unwrap();
    fs::write(
        root.join("models/van_ban.py"),
        "from odoo import models\n\nACTION = {'name': 'Văn bản đến'}\nLABEL = 'Xác nhận'\n",
    )
    .unwrap();
}

pub fn write_glossary(dir: &Path) -> PathBuf {
    let path = dir.join("glossary.toml");
    fs::write(&path, GLOSSARY).unwrap();
    path
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap()
}
