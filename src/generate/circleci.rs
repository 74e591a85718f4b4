//! CircleCI pipeline reading the key from a project environment variable

use super::download_url;

pub fn render(binary: &str, project: &str) -> String {
    format!(
        "version: 2
jobs:
  build:
    docker:
      - image: google/cloud-sdk

    steps:
      - run: |
          apt-get install wget -y
          wget {url} && chmod +x ./{binary}
          echo $GCLOUD_SERVICE_KEY > key.json
          GOOGLE_APPLICATION_CREDENTIALS=key.json ./{binary} --project={project}
",
        url = download_url(binary),
        binary = binary,
        project = project,
    )
}
