use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Mutex;

use parcel_deliver::{DeliverError, Deliverer, Destination, Payload, Transport};
use parcel_order::{
    DeliveryManifest, FulfillmentOptions, OrderError, OrderFulfillment, OrderSpec, OrdinalTotal,
    PackagingFormat, ProductRef, ResolveError, ResourceContainer, ResourceResolver,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("parcel_order=debug,parcel_archive=debug")
        .with_test_writer()
        .try_init();
}

struct Product {
    name:         &'static str,
    data:         Vec<u8>,
    content_type: Option<&'static str>,
}

/// Resolves products from a fixed table. The context is the caller's name;
/// `"nobody"` is refused.
#[derive(Default)]
struct TableResolver {
    products: HashMap<&'static str, Product>,
}

impl TableResolver {
    fn with(mut self, id: &'static str, name: &'static str, data: &[u8]) -> Self {
        self.products.insert(id, Product {
            name,
            data: data.to_vec(),
            content_type: None,
        });
        self
    }

    fn typed(mut self, id: &'static str, name: &'static str, data: &[u8], content_type: &'static str) -> Self {
        self.products.insert(id, Product {
            name,
            data: data.to_vec(),
            content_type: Some(content_type),
        });
        self
    }
}

impl ResourceResolver for TableResolver {
    type Context = String;

    fn resolve(&self, product: &ProductRef, caller: &String) -> Result<ResourceContainer, ResolveError> {
        if caller == "nobody" {
            return Err(ResolveError::Unauthorized(product.product_id.clone()));
        }
        let found = self
            .products
            .get(product.product_id.as_str())
            .ok_or_else(|| ResolveError::NotFound(product.product_id.clone()))?;

        let mut container = ResourceContainer::new(Cursor::new(found.data.clone()), found.name)
            .size(found.data.len() as u64);
        if let Some(content_type) = found.content_type {
            container = container.content_type(content_type);
        }
        Ok(container)
    }
}

#[derive(Debug, Clone)]
struct Pushed {
    host:         String,
    name:         String,
    content_type: String,
    body:         Vec<u8>,
}

/// Records every push; hosts listed in `failing` answer with a transport-level error.
#[derive(Default)]
struct RecordingDeliverer {
    pushed:  Mutex<Vec<Pushed>>,
    failing: Vec<String>,
}

impl RecordingDeliverer {
    fn failing(host: &str) -> Self {
        Self {
            failing: vec![host.to_string()],
            ..Self::default()
        }
    }

    fn pushed(&self) -> Vec<Pushed> { self.pushed.lock().unwrap().clone() }

    fn names(&self) -> Vec<String> { self.pushed().into_iter().map(|p| p.name).collect() }
}

impl Deliverer for RecordingDeliverer {
    fn push(
        &self,
        destination: &Destination,
        name: &str,
        content_type: &str,
        payload: Payload,
    ) -> parcel_deliver::Result<()> {
        if self.failing.contains(&destination.host) {
            return Err(DeliverError::Status {
                url:    format!("http://{}/{name}", destination.authority()),
                status: 503,
            });
        }

        let (mut reader, len) = payload.into_parts();
        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        assert_eq!(body.len() as u64, len, "payload length must match its content");

        self.pushed.lock().unwrap().push(Pushed {
            host: destination.host.clone(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(())
    }
}

fn three_products() -> TableResolver {
    TableResolver::default()
        .with("p1", "one.dat", b"first product")
        .with("p2", "two.dat", b"second product")
        .with("p3", "three.dat", b"third product")
}

fn order(ids: &[&str]) -> OrderSpec {
    OrderSpec::new()
        .products(ids.iter().map(|id| Some(ProductRef::new(*id))))
        .destination(Destination::http("drop", 8080).path("orders"))
}

fn run(
    resolver: TableResolver,
    order: &OrderSpec,
) -> (Result<DeliveryManifest, OrderError>, RecordingDeliverer) {
    init_tracing();
    let deliverer = RecordingDeliverer::default();
    let result = OrderFulfillment::new(resolver, &deliverer).fulfill(order, &"analyst".to_string());
    (result, deliverer)
}

fn unzip(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

fn untar(data: impl Read) -> Vec<(String, Vec<u8>)> {
    let mut archive = tar::Archive::new(data);
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (name, content)
        })
        .collect()
}

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

#[test]
fn empty_product_list_is_rejected() {
    let (result, deliverer) = run(three_products(), &order(&[]));
    assert_eq!(result.unwrap_err(), OrderError::NoProducts);
    assert!(deliverer.pushed().is_empty());

    let missing = OrderSpec::new().destination(Destination::http("drop", 80));
    let (result, _) = run(three_products(), &missing);
    assert_eq!(result.unwrap_err(), OrderError::NoProducts);
}

#[test]
fn only_unsupported_transports_is_rejected() {
    let order = OrderSpec::new()
        .product(ProductRef::new("p1"))
        .destination(Destination::new(Transport::Ftp, "ftp.example", 21))
        .destination(Destination::new(Transport::Physical, "dock", 0));
    let (result, deliverer) = run(three_products(), &order);
    assert_eq!(result.unwrap_err(), OrderError::UnsupportedTransport);
    assert!(deliverer.pushed().is_empty());
}

#[test]
fn uncompressed_files_get_ordinal_names() {
    let order = order(&["p1", "p2", "p3"]).packaging("pkg", PackagingFormat::FilesUncompressed);
    let (result, deliverer) = run(three_products(), &order);
    let manifest = result.unwrap();

    let expected = ["pkg.01.04", "pkg.02.04", "pkg.03.04"];
    assert_eq!(manifest.package_name(), Some("pkg"));
    assert_eq!(manifest.elements().len(), 1);
    assert_eq!(manifest.elements()[0].files(), expected);
    assert_eq!(deliverer.names(), expected);

    let pushed = deliverer.pushed();
    assert_eq!(pushed[1].body, b"second product");
    assert_eq!(pushed[1].content_type, "application/octet-stream");
}

#[test]
fn exact_ordinal_total_when_configured() {
    init_tracing();
    let deliverer = RecordingDeliverer::default();
    let options = FulfillmentOptions::default().ordinal_total(OrdinalTotal::Count);
    let order = order(&["p1", "p2", "p3"]).packaging("pkg", PackagingFormat::FilesUncompressed);

    OrderFulfillment::new(three_products(), &deliverer)
        .with_options(options)
        .fulfill(&order, &"analyst".to_string())
        .unwrap();
    assert_eq!(deliverer.names(), ["pkg.01.03", "pkg.02.03", "pkg.03.03"]);
}

#[test]
fn failed_resolution_skips_only_that_product() {
    let order = order(&["p1", "missing", "p3"]).packaging("pkg", PackagingFormat::FilesGzip);
    let (result, deliverer) = run(three_products(), &order);
    let manifest = result.unwrap();

    assert_eq!(manifest.elements()[0].files(), ["pkg.01.03.gz", "pkg.02.03.gz"]);
    let pushed = deliverer.pushed();
    assert_eq!(gunzip(&pushed[0].body), b"first product");
    assert_eq!(gunzip(&pushed[1].body), b"third product");
    assert!(pushed.iter().all(|p| p.content_type == "application/gzip"));
}

#[test]
fn null_product_entries_are_skipped() {
    let order = OrderSpec::new()
        .products([None, Some(ProductRef::new("p2")), None])
        .packaging("pkg", PackagingFormat::FilesUncompressed)
        .destination(Destination::http("drop", 80));
    let (result, deliverer) = run(three_products(), &order);

    assert_eq!(result.unwrap().elements()[0].files(), ["pkg"]);
    assert_eq!(deliverer.pushed()[0].body, b"second product");
}

#[test]
fn unauthorized_context_yields_empty_elements() {
    init_tracing();
    let deliverer = RecordingDeliverer::default();
    let order = order(&["p1", "p2"]).packaging("pkg", PackagingFormat::TarGzip);

    let manifest = OrderFulfillment::new(three_products(), &deliverer)
        .fulfill(&order, &"nobody".to_string())
        .unwrap();
    assert_eq!(manifest.elements().len(), 1);
    assert!(manifest.elements()[0].files().is_empty());
    assert!(deliverer.pushed().is_empty());
}

#[test]
fn collective_formats_push_one_file() {
    let cases = [
        (PackagingFormat::FilesZip, "pkg.zip", "application/zip"),
        (PackagingFormat::TarUncompressed, "pkg.tar", "application/x-tar"),
        (PackagingFormat::TarZip, "pkg.tar.zip", "application/zip"),
        (PackagingFormat::TarGzip, "pkg.tar.gz", "application/gzip"),
        (PackagingFormat::TarCompressed, "pkg.tar.Z", "application/x-compress"),
    ];
    let expected_entries = vec![
        ("one.dat".to_string(), b"first product".to_vec()),
        ("two.dat".to_string(), b"second product".to_vec()),
        ("three.dat".to_string(), b"third product".to_vec()),
    ];

    for (format, name, content_type) in cases {
        let order = order(&["p1", "p2", "p3"]).packaging("pkg", format);
        let (result, deliverer) = run(three_products(), &order);
        assert_eq!(result.unwrap().elements()[0].files(), [name], "{format}");

        let pushed = deliverer.pushed();
        assert_eq!(pushed.len(), 1, "{format}");
        assert_eq!(pushed[0].content_type, content_type, "{format}");

        let body = &pushed[0].body;
        let entries = match format {
            PackagingFormat::FilesZip => unzip(body),
            PackagingFormat::TarUncompressed => untar(body.as_slice()),
            PackagingFormat::TarGzip => untar(gunzip(body).as_slice()),
            _ => {
                let outer = unzip(body);
                assert_eq!(outer.len(), 1);
                assert_eq!(outer[0].0, "pkg.tar");
                untar(outer[0].1.as_slice())
            }
        };
        assert_eq!(entries, expected_entries, "{format}");
    }
}

#[test]
fn collective_zip_keeps_first_of_duplicate_names() {
    let resolver = TableResolver::default()
        .with("a", "same.txt", b"first")
        .with("b", "same.txt", b"second")
        .with("c", "other.txt", b"third");
    let order = order(&["a", "b", "c"]).packaging("dup", PackagingFormat::FilesZip);
    let (result, deliverer) = run(resolver, &order);

    assert_eq!(result.unwrap().elements()[0].files(), ["dup.zip"]);
    let entries = unzip(&deliverer.pushed()[0].body);
    assert_eq!(entries, vec![
        ("same.txt".to_string(), b"first".to_vec()),
        ("other.txt".to_string(), b"third".to_vec()),
    ]);
}

#[test]
fn tar_keeps_duplicate_names() {
    let resolver = TableResolver::default()
        .with("a", "same.txt", b"first")
        .with("b", "same.txt", b"second");
    let order = order(&["a", "b"]).packaging("dup", PackagingFormat::TarUncompressed);
    let (_, deliverer) = run(resolver, &order);

    assert_eq!(untar(deliverer.pushed()[0].body.as_slice()).len(), 2);
}

#[test]
fn single_product_compressed_uses_bare_name() {
    let order = order(&["p1"]).packaging("solo", PackagingFormat::FilesCompressed);
    let (result, deliverer) = run(three_products(), &order);

    assert_eq!(result.unwrap().elements()[0].files(), ["solo.Z"]);
    let pushed = deliverer.pushed();
    assert_eq!(pushed[0].content_type, "application/x-compress");
    assert_eq!(unzip(&pushed[0].body), vec![("one.dat".to_string(), b"first product".to_vec())]);
}

#[test]
fn single_product_files_zip_is_one_entry_zip() {
    let order = order(&["p2"]).packaging("one", PackagingFormat::FilesZip);
    let (result, deliverer) = run(three_products(), &order);

    assert_eq!(result.unwrap().elements()[0].files(), ["one.zip"]);
    let pushed = deliverer.pushed();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].content_type, "application/zip");
    assert_eq!(unzip(&pushed[0].body), vec![("two.dat".to_string(), b"second product".to_vec())]);
}

#[test]
fn per_file_compressed_zips_each_product() {
    let order = order(&["p1", "p3"]).packaging("pkg", PackagingFormat::FilesCompressed);
    let (result, deliverer) = run(three_products(), &order);

    assert_eq!(result.unwrap().elements()[0].files(), ["pkg.01.03.Z", "pkg.02.03.Z"]);
    let pushed = deliverer.pushed();
    assert_eq!(pushed.len(), 2);
    assert!(pushed.iter().all(|p| p.content_type == "application/x-compress"));
    assert_eq!(unzip(&pushed[0].body), vec![("one.dat".to_string(), b"first product".to_vec())]);
    assert_eq!(unzip(&pushed[1].body), vec![("three.dat".to_string(), b"third product".to_vec())]);
}

#[test]
fn tar_accepts_absolute_and_parent_display_names() {
    let resolver = TableResolver::default()
        .with("abs", "/abs/scene.ntf", b"scene")
        .with("up", "../up.dat", b"up");
    let order = order(&["abs", "up"]).packaging("paths", PackagingFormat::TarUncompressed);
    let (result, deliverer) = run(resolver, &order);

    let manifest = result.unwrap();
    assert_eq!(manifest.elements().len(), 1);
    assert_eq!(manifest.elements()[0].files(), ["paths.tar"]);
    assert_eq!(untar(deliverer.pushed()[0].body.as_slice()), vec![
        ("abs/scene.ntf".to_string(), b"scene".to_vec()),
        ("up.dat".to_string(), b"up".to_vec()),
    ]);
}

#[test]
fn uncompressed_single_product_keeps_its_type() {
    let resolver = TableResolver::default().typed("img", "scene.ntf", b"NITF02.10", "image/nitf");
    let order = order(&["img"]).packaging("scene", PackagingFormat::FilesUncompressed);
    let (_, deliverer) = run(resolver, &order);

    let pushed = deliverer.pushed();
    assert_eq!(pushed[0].name, "scene");
    assert_eq!(pushed[0].content_type, "image/nitf");
}

#[test]
fn base_name_falls_back_to_suggested_then_uuid() {
    let order = OrderSpec::new()
        .product(ProductRef::new("p1"))
        .destination(Destination::http("a", 80).file_name("suggested"))
        .destination(Destination::http("b", 80));
    let (result, deliverer) = run(three_products(), &order);
    let manifest = result.unwrap();

    assert_eq!(manifest.package_name(), None);
    assert_eq!(manifest.elements()[0].files(), ["suggested"]);
    let generated = &manifest.elements()[1].files()[0];
    assert!(uuid::Uuid::parse_str(generated).is_ok(), "{generated}");
    assert_eq!(deliverer.pushed()[1].host, "b");
}

#[test]
fn failing_destination_is_left_out() {
    init_tracing();
    let deliverer = RecordingDeliverer::failing("down");
    let order = order(&["p1", "p2"])
        .packaging("pkg", PackagingFormat::TarGzip)
        .destination(Destination::http("down", 80))
        .destination(Destination::new(Transport::Email, "mail", 25))
        .destination(Destination::https("mirror", 443));

    let manifest = OrderFulfillment::new(three_products(), &deliverer)
        .fulfill(&order, &"analyst".to_string())
        .unwrap();

    assert_eq!(manifest.elements().len(), 2);
    let hosts: Vec<_> = deliverer.pushed().into_iter().map(|p| p.host).collect();
    assert_eq!(hosts, ["drop", "mirror"]);
    assert!(manifest.files().all(|file| file == "pkg.tar.gz"));
}

#[test]
fn spill_files_are_removed_after_fulfillment() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let deliverer = RecordingDeliverer::default();
    let options = FulfillmentOptions::default()
        .spill_threshold(4)
        .staging_threshold(4)
        .spill_dir(dir.path());
    let order = order(&["p1", "p2", "p3"]).packaging("pkg", PackagingFormat::TarZip);

    OrderFulfillment::new(three_products(), &deliverer)
        .with_options(options)
        .fulfill(&order, &"analyst".to_string())
        .unwrap();

    let outer = unzip(&deliverer.pushed()[0].body);
    assert_eq!(untar(outer[0].1.as_slice()).len(), 3);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn manifest_serializes_for_the_response() {
    let order = order(&["p1", "p2"]).packaging("pkg", PackagingFormat::FilesZip);
    let (result, _) = run(three_products(), &order);
    let manifest = result.unwrap();

    let json = serde_json::to_value(&manifest).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "package_name": "pkg", "elements": [{ "files": ["pkg.zip"] }] })
    );
    let back: DeliveryManifest = serde_json::from_value(json).unwrap();
    assert_eq!(back, manifest);
}

#[test]
fn order_deserializes_with_format_token() {
    let order: OrderSpec = serde_json::from_str(
        r#"{
            "products": [{"product_id": "p1"}, null],
            "packaging": {"package_identifier": "pkg", "format": "TAR GZIP"},
            "destinations": [{"transport": "http", "host": "drop", "port": 80}]
        }"#,
    )
    .unwrap();

    assert_eq!(order.format(), PackagingFormat::TarGzip);
    assert_eq!(order.products.as_ref().map(Vec::len), Some(2));
    let (result, deliverer) = run(three_products(), &order);
    assert_eq!(result.unwrap().elements()[0].files(), ["pkg.tar.gz"]);
    assert_eq!(deliverer.pushed().len(), 1);
}
