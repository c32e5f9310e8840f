//! Enums whose constants stand for qualified names; written to JSON as URI strings.

use std::collections::HashSet;

use crate::decl::{Declaration, Package, QNameBase, QNameEnum};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QNameValue {
    pub constant: String,
    /// `None` for the catch-all unknown constant.
    pub uri: Option<String>,
}

/// Constant → URI table for a qname enum, validating its metadata.
pub fn enum_values(
    decl: &Declaration,
    info: &QNameEnum,
    package: Option<&Package>,
) -> Result<Vec<QNameValue>, ConfigError> {
    if info.base != QNameBase::Uri {
        return Err(ConfigError::QNameEnumBase {
            name: decl.name.clone(),
            base: format!("{:?}", info.base).to_uppercase(),
        });
    }

    let namespace = info
        .namespace
        .clone()
        .or_else(|| package.and_then(|p| p.namespace.clone()))
        .unwrap_or_default();

    let mut values = Vec::with_capacity(decl.constants.len());
    let mut seen = HashSet::new();
    let mut unknown = None;
    for constant in &decl.constants {
        if constant.unknown {
            if unknown.is_some() {
                return Err(ConfigError::DuplicateUnknownQName { name: decl.name.clone() });
            }
            unknown = Some(constant.name.clone());
            continue;
        }
        if constant.exclude {
            continue;
        }

        let ns = constant.namespace.as_deref().unwrap_or(&namespace);
        let local = constant.local_part.as_deref().unwrap_or(&constant.name);
        let uri = format!("{ns}{local}");
        if !seen.insert(uri.clone()) {
            return Err(ConfigError::DuplicateQNameValue { name: decl.name.clone(), uri });
        }
        values.push(QNameValue { constant: constant.name.clone(), uri: Some(uri) });
    }

    if let Some(constant) = unknown {
        values.push(QNameValue { constant, uri: None });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{DeclKind, EnumConstant};

    fn constant(name: &str) -> EnumConstant {
        EnumConstant { name: name.into(), ..EnumConstant::default() }
    }

    fn color() -> Declaration {
        let mut d = Declaration::new("com.acme.Color", DeclKind::Enum);
        d.constants = vec![
            constant("RED"),
            EnumConstant { local_part: Some("verde".into()), ..constant("GREEN") },
            EnumConstant { namespace: Some("urn:other:".into()), ..constant("BLUE") },
            EnumConstant { exclude: true, ..constant("LEGACY") },
            EnumConstant { unknown: true, ..constant("OTHER") },
        ];
        d
    }

    #[test]
    fn values_use_package_namespace_and_overrides() {
        let pkg = Package { name: "com.acme".into(), namespace: Some("urn:acme:".into()), ..Package::default() };
        let values = enum_values(&color(), &QNameEnum::default(), Some(&pkg)).unwrap();
        let uris: Vec<_> = values.iter().map(|v| (v.constant.as_str(), v.uri.as_deref())).collect();
        assert_eq!(uris, vec![
            ("RED", Some("urn:acme:RED")),
            ("GREEN", Some("urn:acme:verde")),
            ("BLUE", Some("urn:other:BLUE")),
            ("OTHER", None),
        ]);
    }

    #[test]
    fn enum_namespace_beats_package() {
        let info = QNameEnum { namespace: Some("urn:enum:".into()), ..QNameEnum::default() };
        let values = enum_values(&color(), &info, None).unwrap();
        assert_eq!(values[0].uri.as_deref(), Some("urn:enum:RED"));
    }

    #[test]
    fn non_uri_base_is_rejected() {
        let info = QNameEnum { base: QNameBase::Qname, ..QNameEnum::default() };
        let err = enum_values(&color(), &info, None).unwrap_err();
        assert_eq!(err.to_string(), "qname enum com.acme.Color cannot be serialized to JSON because its base is QNAME");
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut d = color();
        d.constants.push(EnumConstant { local_part: Some("RED".into()), ..constant("CRIMSON") });
        assert!(matches!(
            enum_values(&d, &QNameEnum::default(), None),
            Err(ConfigError::DuplicateQNameValue { .. })
        ));

        let mut d = color();
        d.constants.push(EnumConstant { unknown: true, ..constant("MISC") });
        assert!(matches!(
            enum_values(&d, &QNameEnum::default(), None),
            Err(ConfigError::DuplicateUnknownQName { .. })
        ));
    }
}
