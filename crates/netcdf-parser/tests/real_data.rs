//! Tests against downloaded HadUK-Grid files. Skipped unless the file is
//! present in `$TEST_DATA_DIR` or a `testdata/` directory.

use netcdf_parser::{data_variables, NetCdfDataset, NetCdfSource};
use point_extractor::{PointRequest, SeriesAssembler};
use series_common::{CoordinateSystem, RasterDataset};
use test_utils::require_test_file;

const HADUK_JANUARY: &str = "rainfall_hadukgrid_uk_1km_day_20210101-20210131.nc";

#[test]
fn test_haduk_daily_rainfall_metadata() {
    let path = require_test_file!(HADUK_JANUARY);

    let ds = NetCdfDataset::open(&path).unwrap();
    let meta = ds.metadata("rainfall").unwrap();
    let [nt, ny, nx] = meta.shape();
    assert_eq!(nt, 31);
    assert!(ny > 0 && nx > 0);
    assert!(meta.variable.fill_value.is_some());
    assert!(data_variables(&NetCdfSource::from_path(&path))
        .unwrap()
        .contains(&"rainfall".to_string()));
}

#[test]
fn test_haduk_point_series_covers_january() {
    let path = require_test_file!(HADUK_JANUARY);

    // Land cell in the Pennines
    let request = PointRequest::new("rainfall", 390_500.0, 450_500.0)
        .with_coordinate_system(CoordinateSystem::BritishNationalGrid);
    let result = SeriesAssembler::default()
        .assemble(&[NetCdfSource::from_path(&path)], &request)
        .unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.series.len(), 31);
    assert!(result.series.iter().all(|s| s.value >= 0.0 && s.value < 500.0));

    let first = &result.series.samples()[0];
    let last = &result.series.samples()[30];
    assert_eq!((first.timestamp.year, first.timestamp.month, first.timestamp.day), (2021, 1, 1));
    assert_eq!((last.timestamp.year, last.timestamp.month, last.timestamp.day), (2021, 1, 31));
    assert_eq!(result.summary.count, 31);
}
