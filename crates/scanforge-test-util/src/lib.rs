//! Shared test fixtures for the scanforge workspace.
//!
//! Integration tests across several crates need the same sample exports,
//! catalog documents, template trees and fake compiler scripts, so the
//! builders live in a real crate instead of `#[cfg(test)]` modules.

#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::json;

/// A small web-application export for the given target: three real
/// findings plus one informational that extraction must drop.
pub fn sample_webapp_export(target: &str) -> String {
    json!({
        "scan": { "target": target },
        "findings": [
            {
                "name": "Cross-Site Scripting (Reflected)",
                "risk_factor": "High",
                "uri": "/search?q=test",
                "plugin_id": 98050
            },
            {
                "name": "Cross-Site Scripting (Reflected)",
                "risk_factor": "High",
                "uri": "/profile",
                "plugin_id": 98050
            },
            {
                "name": "Missing Content-Security-Policy",
                "risk_factor": "Medium",
                "uri": "/",
                "plugin_id": "112551"
            },
            {
                "name": "Server Version Disclosure",
                "risk_factor": "Info",
                "uri": "/",
                "plugin_id": 10107
            }
        ]
    })
    .to_string()
}

/// A small infrastructure export: two hosts, one severity conflict on
/// purpose (`Weak SSH MAC Algorithms` appears as both High and Medium).
pub fn sample_infra_csv() -> String {
    "\
Name,Host,Risk,Port
Weak SSH MAC Algorithms,10.10.0.1,High,22
Weak SSH MAC Algorithms,10.10.0.2,Medium,22
Outdated OpenSSL,10.10.0.1,Critical,443
Service Banner,10.10.0.2,None,80
"
    .to_string()
}

/// A catalog that covers every vulnerability in the sample exports.
pub fn sample_catalog_json() -> String {
    json!({
        "vulnerabilities": [
            {
                "category": "Client-Side",
                "description": "Issues executed in the visitor's browser.",
                "subcategories": [
                    {
                        "subcategory": "Cross-Site Scripting",
                        "description": "Script injection into rendered pages.",
                        "entries": [
                            {
                                "name": "Cross-Site Scripting (Reflected)",
                                "description": "Input is echoed without encoding.",
                                "remediation": "Encode output; validate input.",
                                "image": "assets/images/xss proof.png"
                            }
                        ]
                    }
                ],
                "entries": [
                    {
                        "name": "Missing Content-Security-Policy",
                        "description": "No CSP header is served.",
                        "remediation": "Define a restrictive policy."
                    }
                ]
            },
            {
                "category": "Cryptography",
                "description": "Weak or outdated cryptographic primitives.",
                "entries": [
                    {
                        "name": "Weak SSH MAC Algorithms",
                        "description": "The SSH service accepts weak MACs.",
                        "remediation": "Disable MD5 and 96-bit MACs."
                    },
                    {
                        "name": "Outdated OpenSSL",
                        "description": "The OpenSSL build is end-of-life.",
                        "remediation": "Upgrade to a supported release."
                    }
                ]
            }
        ]
    })
    .to_string()
}

/// Write a minimal document template tree: a `main.tex` carrying the
/// standard placeholders and the required `preamble.tex`.
pub fn write_template_tree(dir: &Utf8Path) {
    std::fs::create_dir_all(dir).expect("create template dir");
    std::fs::write(
        dir.join("preamble.tex"),
        "\\usepackage{graphicx}\n\\usepackage{multicol}\n\\usepackage{hyperref}\n",
    )
    .expect("write preamble.tex");
    std::fs::write(
        dir.join("main.tex"),
        "\\documentclass{article}\n\
         \\input{preamble.tex}\n\
         \\begin{document}\n\
         Audit for [ORGANIZATION NAME] ([ACRONYM])\n\
         Total findings: [TOTAL VULNERABILITIES]\n\
         Web: [TOTAL VULNERABILITIES WEB] Infra: [TOTAL VULNERABILITIES INFRA]\n\
         Sites analysed: [TOTAL SITES] Hosts analysed: [TOTAL HOSTS]\n\
         [SEVERITY DONUT WEB]\n\
         [SEVERITY DONUT INFRA]\n\
         [SITE BAR CHART]\n\
         [WEB CONTENT]\n\
         [INFRA CONTENT]\n\
         \\end{document}\n",
    )
    .expect("write main.tex");
}

/// Write an executable stand-in for the external compiler and return its
/// path. The script body runs with the output directory as its working
/// directory, exactly like the real compiler invocation.
#[cfg(unix)]
pub fn write_fake_compiler(dir: &Utf8Path, name: &str, body: &str) -> Utf8PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).expect("create script dir");
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake compiler");
    std::fs::set_permissions(path.as_std_path(), std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake compiler");
    path
}
