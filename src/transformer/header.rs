//! Request/response header serializer.

use super::{encode_header_map, split_header_names, Direction, HeaderMap};
use crate::config::{Settings, TransformConfig};
use crate::context::VariableStore;
use tracing::{debug, error, trace, warn};

/// Output written when a map cannot be encoded.
const EMPTY_ENCODED: &str = r#""{}""#;

/// Serializes listed request and response headers into output variables.
#[derive(Debug, Clone, Default)]
pub struct HeaderTransformer {
    config: TransformConfig,
}

/// Summary of one direction's pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionReport {
    /// Direction processed
    pub direction: Direction,
    /// Whether the name list variable was defined
    pub list_present: bool,
    /// Distinct header names written
    pub headers: usize,
    /// Listed headers with no value
    pub missing: usize,
    /// Variable the encoded map was written to
    pub output_variable: String,
}

/// One direction's headers, read but not yet written.
struct Collected {
    direction: Direction,
    list_present: bool,
    map: HeaderMap,
}

/// Summary of a full transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformReport {
    pub request: DirectionReport,
    pub response: DirectionReport,
}

impl HeaderTransformer {
    /// Create a new header transformer from configuration.
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    fn settings(&self) -> &Settings {
        &self.config.settings
    }

    /// Build the header map for one direction.
    ///
    /// An undefined list variable yields an empty map.
    pub fn collect<S: VariableStore + ?Sized>(
        &self,
        store: &S,
        direction: Direction,
    ) -> HeaderMap {
        self.read(store, direction).map
    }

    fn read<S: VariableStore + ?Sized>(&self, store: &S, direction: Direction) -> Collected {
        let cfg = self.config.direction(direction);

        let Some(raw) = store.get_variable(&cfg.names_variable) else {
            warn!(
                %direction,
                variable = %cfg.names_variable,
                "Header name list not defined, writing empty map"
            );
            return Collected {
                direction,
                list_present: false,
                map: HeaderMap::new(),
            };
        };

        let map = split_header_names(&raw)
            .into_iter()
            .map(|name| {
                let value = store.get_variable(&cfg.value_variable(&name));
                trace!(%direction, header = %name, present = value.is_some(), "Read header");
                (name, value)
            })
            .collect();

        Collected {
            direction,
            list_present: true,
            map,
        }
    }

    fn write<S: VariableStore + ?Sized>(
        &self,
        store: &mut S,
        collected: Collected,
    ) -> DirectionReport {
        let Collected {
            direction,
            list_present,
            map,
        } = collected;
        let cfg = self.config.direction(direction);

        let encoded = match encode_header_map(&map, self.settings().missing_values) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(%direction, error = %e, "Failed to encode headers, writing empty map");
                EMPTY_ENCODED.to_string()
            }
        };
        store.set_variable(&cfg.output_variable, encoded);

        let report = DirectionReport {
            direction,
            list_present,
            headers: map.len(),
            missing: map.missing_count(),
            output_variable: cfg.output_variable.clone(),
        };

        debug!(
            %direction,
            headers = report.headers,
            missing = report.missing,
            output = %report.output_variable,
            "Serialized headers"
        );

        report
    }

    /// Encode one direction and write it to its output variable.
    pub fn apply_direction<S: VariableStore + ?Sized>(
        &self,
        store: &mut S,
        direction: Direction,
    ) -> DirectionReport {
        let collected = self.read(&*store, direction);
        self.write(store, collected)
    }

    /// Serialize request and response headers.
    ///
    /// Both directions are read before either output is written, so an
    /// output variable never feeds the other direction's input.
    pub fn apply<S: VariableStore + ?Sized>(&self, store: &mut S) -> TransformReport {
        let request = self.read(&*store, Direction::Request);
        let response = self.read(&*store, Direction::Response);

        TransformReport {
            request: self.write(store, request),
            response: self.write(store, response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::VariableContext;
    use crate::transformer::{decode_header_map, MissingValue};

    fn make_context() -> VariableContext {
        VariableContext::new()
            .with_variable("request.headers.names", "[Host, Accept, X-Trace]")
            .with_variable("request.header.Host", "example.com")
            .with_variable("request.header.Accept", "*/*")
            .with_variable("response.headers.names", "[Content-Type]")
            .with_variable("response.header.Content-Type", "application/json")
    }

    #[test]
    fn test_collect_request() {
        let transformer = HeaderTransformer::default();
        let map = transformer.collect(&make_context(), Direction::Request);

        assert_eq!(map.names().collect::<Vec<_>>(), vec!["Host", "Accept", "X-Trace"]);
        assert_eq!(map.get("Host"), Some(Some("example.com")));
        assert_eq!(map.get("Accept"), Some(Some("*/*")));
        assert_eq!(map.get("X-Trace"), Some(None));
    }

    #[test]
    fn test_apply_writes_both_outputs() {
        let transformer = HeaderTransformer::default();
        let mut ctx = make_context();
        let report = transformer.apply(&mut ctx);

        assert_eq!(report.request.headers, 3);
        assert_eq!(report.request.missing, 1);
        assert_eq!(report.response.headers, 1);
        assert!(report.response.list_present);

        assert_eq!(
            ctx.get("apic.reqHeaders"),
            Some(r#""{\"Host\":\"example.com\",\"Accept\":\"*/*\",\"X-Trace\":null}""#)
        );
        assert_eq!(
            ctx.get("apic.resHeaders"),
            Some(r#""{\"Content-Type\":\"application/json\"}""#)
        );
    }

    #[test]
    fn test_missing_list_writes_empty_map() {
        let transformer = HeaderTransformer::default();
        let mut ctx = VariableContext::new()
            .with_variable("request.headers.names", "[Host]")
            .with_variable("request.header.Host", "example.com");

        let report = transformer.apply(&mut ctx);

        assert!(!report.response.list_present);
        assert_eq!(report.response.headers, 0);
        assert_eq!(ctx.get("apic.resHeaders"), Some(r#""{}""#));
    }

    #[test]
    fn test_omit_missing_values() {
        let mut config = TransformConfig::default();
        config.settings.missing_values = MissingValue::Omit;
        let transformer = HeaderTransformer::new(config);

        let mut ctx = make_context();
        let report = transformer.apply(&mut ctx);

        // Still counted, just not written
        assert_eq!(report.request.missing, 1);
        let decoded = decode_header_map(ctx.get("apic.reqHeaders").unwrap()).unwrap();
        assert_eq!(decoded.names().collect::<Vec<_>>(), vec!["Host", "Accept"]);
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let transformer = HeaderTransformer::default();
        let ctx = VariableContext::new()
            .with_variable("request.headers.names", "[Accept, Host, Accept]")
            .with_variable("request.header.Accept", "text/html")
            .with_variable("request.header.Host", "example.com");

        let map = transformer.collect(&ctx, Direction::Request);
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["Accept", "Host"]);
    }

    #[test]
    fn test_reads_both_directions_before_writing() {
        let mut config = TransformConfig::default();
        config.request.output_variable = "response.headers.names".to_string();
        let transformer = HeaderTransformer::new(config);

        let mut ctx = VariableContext::new()
            .with_variable("request.headers.names", "[Host]")
            .with_variable("request.header.Host", "example.com")
            .with_variable("response.headers.names", "[Server]")
            .with_variable("response.header.Server", "s");

        let report = transformer.apply(&mut ctx);

        assert_eq!(report.response.headers, 1);
        assert_eq!(ctx.get("apic.resHeaders"), Some(r#""{\"Server\":\"s\"}""#));
        assert_eq!(
            ctx.get("response.headers.names"),
            Some(r#""{\"Host\":\"example.com\"}""#)
        );
    }

    #[test]
    fn test_apply_direction_single() {
        let transformer = HeaderTransformer::default();
        let mut ctx = make_context();

        let report = transformer.apply_direction(&mut ctx, Direction::Response);

        assert_eq!(report.output_variable, "apic.resHeaders");
        assert!(report.list_present);
        assert_eq!(ctx.get("apic.reqHeaders"), None);
    }
}
