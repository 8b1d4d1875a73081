// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod landing_store_local_fs;
pub use landing_store_local_fs::*;

mod landing_store_s3;
pub use landing_store_s3::*;
